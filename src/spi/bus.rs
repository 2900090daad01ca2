use std::io;

pub trait SpiBus {
	/// Full-duplex transfer: shift out `tx` while capturing the same number
	/// of bytes into `rx`. Chip select is asserted for the whole transfer.
	fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> io::Result<()>;

	fn speed_hz(&self) -> u32;
}

impl<'a, B: ?Sized + SpiBus> SpiBus for &'a mut B {
	fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> io::Result<()> {
		B::transfer(*self, tx, rx)
	}

	fn speed_hz(&self) -> u32 {
		B::speed_hz(*self)
	}
}
