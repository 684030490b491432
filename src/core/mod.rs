pub mod form;
pub mod person;
pub mod task;
pub mod view;
