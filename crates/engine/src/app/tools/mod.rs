mod stress_test;

pub use stress_test::{
    StressTest, StressToggle, STRESS_ANGULAR_SPEED_DEG_PER_SEC, STRESS_SPRITE_COUNT,
    STRESS_SPRITE_SIZE,
};
