pub mod attendance;
pub mod core;
pub mod courses;
pub mod guardians;
pub mod requests;
pub mod roster;
pub mod session;
pub mod students;
