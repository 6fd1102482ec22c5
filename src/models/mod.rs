pub mod assessment;
pub mod checkin;
pub mod enums;

pub use assessment::*;
pub use checkin::*;
pub use enums::*;
