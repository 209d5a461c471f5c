pub mod call_state;
pub mod handle;
pub mod hold_timer;
pub mod worker;
