pub mod completion;
pub mod controller;
pub mod navigation;
pub mod router;
pub mod steps;
pub mod store;
pub mod validation;
