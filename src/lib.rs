pub mod bus;
pub mod common;
pub mod layout_engine;
pub mod model;
pub mod services;
pub mod sys;
