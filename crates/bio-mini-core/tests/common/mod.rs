//! Shared mock collaborators: an ADS1299 register-file simulation behind
//! the SPI device trait, a recording output pin, a byte-sink host link and
//! a no-op delay.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use bio_mini_core::Board;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, Operation, SpiDevice};
use portable_atomic::AtomicBool;

pub const NUM_REGS: usize = 24;

/// Device ID of an ADS1299-4: revision 001, DEV_ID 11, NU_CH 00.
pub const DEVICE_ID: u8 = 0x3C;

pub struct SimState {
    pub regs: [u8; NUM_REGS],
    pub continuous: bool,
    pub running: bool,
    /// Chip command opcodes in arrival order.
    pub cmd_log: Vec<u8>,
    /// Register writes as (address, value), in arrival order.
    pub write_log: Vec<(u8, u8)>,
    /// Frames served to `read_frame`, oldest first.
    pub frames: VecDeque<Vec<u8>>,
}

impl SimState {
    fn power_on_regs() -> [u8; NUM_REGS] {
        let mut regs = [0u8; NUM_REGS];
        regs[0x00] = DEVICE_ID;
        regs[0x01] = 0x96; // CONFIG1
        regs[0x02] = 0xC0; // CONFIG2
        regs[0x03] = 0x60; // CONFIG3
        for addr in 0x05..=0x0C {
            regs[addr] = 0x61; // CHnSET
        }
        regs[0x14] = 0x0F; // GPIO
        regs
    }
}

#[derive(Clone)]
pub struct AdsSim(pub Rc<RefCell<SimState>>);

impl AdsSim {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(SimState {
            regs: SimState::power_on_regs(),
            continuous: false,
            running: false,
            cmd_log: Vec::new(),
            write_log: Vec::new(),
            frames: VecDeque::new(),
        })))
    }

    pub fn reg(&self, addr: u8) -> u8 {
        self.0.borrow().regs[addr as usize]
    }

    pub fn push_frame(&self, status: u32, values: [i32; 4]) {
        let mut frame = vec![
            (status >> 16) as u8,
            (status >> 8) as u8,
            status as u8,
        ];
        for value in values {
            let bytes = value.to_be_bytes();
            frame.extend_from_slice(&bytes[1..4]);
        }
        self.0.borrow_mut().frames.push_back(frame);
    }

    pub fn cmd_log(&self) -> Vec<u8> {
        self.0.borrow().cmd_log.clone()
    }

    pub fn write_log(&self) -> Vec<(u8, u8)> {
        self.0.borrow().write_log.clone()
    }

    pub fn clear_logs(&self) {
        let mut state = self.0.borrow_mut();
        state.cmd_log.clear();
        state.write_log.clear();
    }

    fn chip_command(&self, opcode: u8) {
        let mut state = self.0.borrow_mut();
        state.cmd_log.push(opcode);
        match opcode {
            0x06 => {
                state.regs = SimState::power_on_regs();
                // The device wakes up streaming.
                state.continuous = true;
            }
            0x08 => state.running = true,
            0x0A => state.running = false,
            0x10 => state.continuous = true,
            0x11 => state.continuous = false,
            _ => {}
        }
    }

    fn read_regs(&self, addr: u8, buf: &mut [u8]) {
        let state = self.0.borrow();
        assert!(
            !state.continuous,
            "register read while the device is in continuous-read mode"
        );
        for (i, dst) in buf.iter_mut().enumerate() {
            *dst = state.regs[addr as usize + i];
        }
    }

    fn write_regs(&self, addr: u8, values: &[u8]) {
        let mut state = self.0.borrow_mut();
        assert!(
            !state.continuous,
            "register write while the device is in continuous-read mode"
        );
        for (i, &value) in values.iter().enumerate() {
            state.regs[addr as usize + i] = value;
            state.write_log.push((addr + i as u8, value));
        }
    }

    fn read_frame(&self, buf: &mut [u8]) {
        let mut state = self.0.borrow_mut();
        let frame = state.frames.pop_front().unwrap_or_default();
        for (i, dst) in buf.iter_mut().enumerate() {
            *dst = frame.get(i).copied().unwrap_or(0);
        }
    }
}

/// SPI device feeding the simulation. Interprets the same transaction
/// shapes the driver emits: chip commands, SDATAC-prefixed register
/// accesses, and bare frame reads.
pub struct MockSpi {
    pub sim: AdsSim,
}

impl spi::ErrorType for MockSpi {
    type Error = Infallible;
}

impl SpiDevice<u8> for MockSpi {
    fn transaction(
        &mut self,
        operations: &mut [Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        // Pending RREG header waiting for its transfer operation.
        let mut pending_read: Option<(u8, usize)> = None;
        // Pending WREG header waiting for its data write.
        let mut pending_write: Option<(u8, usize)> = None;

        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    if let Some((addr, count)) = pending_write.take() {
                        assert_eq!(bytes.len(), count);
                        self.sim.write_regs(addr, bytes);
                    } else if bytes.len() == 1 {
                        self.sim.chip_command(bytes[0]);
                    } else if bytes.len() == 2 && bytes[0] & 0xE0 == 0x20 {
                        pending_read =
                            Some((bytes[0] & 0x1F, bytes[1] as usize + 1));
                    } else if bytes.len() == 2 && bytes[0] & 0xE0 == 0x40 {
                        pending_write =
                            Some((bytes[0] & 0x1F, bytes[1] as usize + 1));
                    } else {
                        panic!("unexpected SPI write: {:02X?}", bytes);
                    }
                }
                Operation::TransferInPlace(buf) => {
                    let (addr, count) = pending_read
                        .take()
                        .expect("transfer without an RREG header");
                    assert_eq!(buf.len(), count);
                    self.sim.read_regs(addr, buf);
                }
                Operation::Read(buf) => {
                    assert!(
                        self.sim.0.borrow().continuous,
                        "frame read outside continuous-read mode"
                    );
                    self.sim.read_frame(buf);
                }
                Operation::Transfer(_, _) => {
                    panic!("driver does not use Transfer")
                }
                Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}

/// Output pin recording every level change.
#[derive(Clone, Default)]
pub struct PinHandle(pub Rc<RefCell<Vec<bool>>>);

pub struct MockPin {
    pub levels: PinHandle,
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.0.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.0.borrow_mut().push(true);
        Ok(())
    }
}

/// Host byte sink shared with the test for inspection.
#[derive(Clone, Default)]
pub struct HostSink(pub Rc<RefCell<Vec<u8>>>);

impl HostSink {
    pub fn take_string(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn take_bytes(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl embedded_io::ErrorType for HostSink {
    type Error = Infallible;
}

impl embedded_io::Write for HostSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

pub type TestBoard<'a> = Board<'a, MockSpi, MockPin, HostSink, NoDelay>;

pub struct Fixture {
    pub sim: AdsSim,
    pub pin: PinHandle,
    pub host: HostSink,
}

pub fn board(drdy: &AtomicBool) -> (TestBoard<'_>, Fixture) {
    let sim = AdsSim::new();
    let pin = PinHandle::default();
    let host = HostSink::default();
    let board = Board::new(
        MockSpi { sim: sim.clone() },
        MockPin { levels: pin.clone() },
        host.clone(),
        NoDelay,
        drdy,
    );
    (board, Fixture { sim, pin, host })
}

/// A board that has been through the full reset/default sequence, with the
/// bring-up traffic cleared out of the logs.
pub fn ready_board(drdy: &AtomicBool) -> (TestBoard<'_>, Fixture) {
    let (mut board, fixture) = board(drdy);
    board.board_reset().unwrap();
    fixture.sim.clear_logs();
    let _ = fixture.host.take_bytes();
    (board, fixture)
}
