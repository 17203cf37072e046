pub(crate) mod channel_controller;
pub(crate) mod health_check_controller;
