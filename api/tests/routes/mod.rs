mod attendance;
mod health_test;
