mod bus;
mod linux;

pub use self::bus::{
	SpiBus,
};

// OS-specific. for now linux only.
pub use self::linux::{
	open_device,
};
