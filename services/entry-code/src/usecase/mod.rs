pub mod unlock;
pub mod validate;
