pub mod delete;
pub mod month;
pub mod new;
pub mod upcoming;
