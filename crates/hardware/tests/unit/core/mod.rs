pub mod execute;
pub mod execute_hold;
pub mod memaccess;
