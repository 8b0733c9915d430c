mod reservation;
mod slot;

pub use self::reservation::*;
pub use self::slot::*;
