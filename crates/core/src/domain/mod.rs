pub mod error;
pub mod form;
pub mod nullable;
pub mod opportunity;
pub mod validation;
