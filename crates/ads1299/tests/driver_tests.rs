use std::collections::VecDeque;
use std::convert::Infallible;

use ads1299::{Ads1299, Command, Register};
use embedded_hal::spi::{ErrorType, Operation, SpiDevice};

// ---------------------------------------------------------------------------
// Recording SPI mock
// ---------------------------------------------------------------------------

/// One operation inside a chip-select frame, as seen by the device.
#[derive(Debug, PartialEq, Eq)]
enum Op {
    Write(Vec<u8>),
    Transfer(usize),
    Read(usize),
    Delay(u32),
}

/// Records every transaction and feeds scripted bytes back on reads.
#[derive(Default)]
struct RecordingSpi {
    transactions: Vec<Vec<Op>>,
    read_data: VecDeque<Vec<u8>>,
}

impl ErrorType for RecordingSpi {
    type Error = Infallible;
}

impl SpiDevice<u8> for RecordingSpi {
    fn transaction(
        &mut self,
        operations: &mut [Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        let mut ops = Vec::new();
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => ops.push(Op::Write(bytes.to_vec())),
                Operation::Transfer(rx, _tx) => {
                    self.fill(rx);
                    ops.push(Op::Transfer(rx.len()));
                }
                Operation::TransferInPlace(buf) => {
                    self.fill(buf);
                    ops.push(Op::Transfer(buf.len()));
                }
                Operation::Read(buf) => {
                    self.fill(buf);
                    ops.push(Op::Read(buf.len()));
                }
                Operation::DelayNs(ns) => ops.push(Op::Delay(*ns)),
            }
        }
        self.transactions.push(ops);
        Ok(())
    }
}

impl RecordingSpi {
    fn fill(&mut self, buf: &mut [u8]) {
        let data = self.read_data.pop_front().unwrap_or_default();
        for (dst, src) in buf.iter_mut().zip(data) {
            *dst = src;
        }
    }
}

fn driver() -> Ads1299<RecordingSpi> {
    Ads1299::new(RecordingSpi::default())
}

// ---------------------------------------------------------------------------
// Command plane
// ---------------------------------------------------------------------------

#[test]
fn reset_holds_chip_select_through_settle() {
    let mut ads = driver();
    ads.cmd(Command::Reset).unwrap();

    let spi = ads.release();
    assert_eq!(
        spi.transactions,
        vec![vec![Op::Write(vec![0x06]), Op::Delay(12_000)]]
    );
}

#[test]
fn start_and_stop_have_no_settle_operation() {
    let mut ads = driver();
    ads.cmd(Command::Start).unwrap();
    ads.cmd(Command::Stop).unwrap();

    let spi = ads.release();
    assert_eq!(spi.transactions[0], vec![Op::Write(vec![0x08])]);
    assert_eq!(spi.transactions[1], vec![Op::Write(vec![0x0A])]);
}

#[test]
fn continuous_read_mode_commands_settle_in_frame() {
    let mut ads = driver();
    ads.cmd(Command::Rdatac).unwrap();
    ads.cmd(Command::Sdatac).unwrap();

    let spi = ads.release();
    assert_eq!(
        spi.transactions[0],
        vec![Op::Write(vec![0x10]), Op::Delay(3_000)]
    );
    assert_eq!(
        spi.transactions[1],
        vec![Op::Write(vec![0x11]), Op::Delay(10_000)]
    );
}

// ---------------------------------------------------------------------------
// Register plane
// ---------------------------------------------------------------------------

#[test]
fn register_read_leads_with_sdatac_in_the_same_frame() {
    let mut spi = RecordingSpi::default();
    spi.read_data.push_back(vec![0x96]);
    let mut ads = Ads1299::new(spi);

    let value = ads.read_register(Register::CONFIG1).unwrap();
    assert_eq!(value, 0x96);

    let spi = ads.release();
    assert_eq!(
        spi.transactions,
        vec![vec![
            // SDATAC first: register traffic is undefined in RDATAC.
            Op::Write(vec![0x11]),
            // RREG CONFIG1, one register.
            Op::Write(vec![0x21, 0x00]),
            Op::Transfer(1),
        ]]
    );
}

#[test]
fn register_write_encodes_wreg_opcode_and_count() {
    let mut ads = driver();
    ads.write_register(Register::MISC1, 0x20).unwrap();

    let spi = ads.release();
    assert_eq!(
        spi.transactions,
        vec![vec![
            Op::Write(vec![0x11]),
            Op::Write(vec![0x55, 0x00]),
            Op::Write(vec![0x20]),
        ]]
    );
}

#[test]
fn full_map_dump_reads_24_registers_from_id() {
    let mut ads = driver();
    let mut buf = [0u8; ads1299::NUM_REGISTERS];
    ads.read_all_registers(&mut buf).unwrap();

    let spi = ads.release();
    assert_eq!(
        spi.transactions,
        vec![vec![
            Op::Write(vec![0x11]),
            Op::Write(vec![0x20, 23]),
            Op::Transfer(24),
        ]]
    );
}

#[test]
fn modify_register_reads_then_writes_back() {
    let mut spi = RecordingSpi::default();
    spi.read_data.push_back(vec![0b0000_0101]);
    let mut ads = Ads1299::new(spi);

    ads.modify_register(Register::CONFIG2, |v| v | 0x10).unwrap();

    let spi = ads.release();
    assert_eq!(spi.transactions.len(), 2);
    assert_eq!(
        spi.transactions[1],
        vec![
            Op::Write(vec![0x11]),
            Op::Write(vec![0x42, 0x00]),
            Op::Write(vec![0b0001_0101]),
        ]
    );
}

#[test]
fn probe_accepts_a_plausible_id_and_rejects_a_floating_bus() {
    // DEV_ID = 0b11, 4-channel variant.
    let mut spi = RecordingSpi::default();
    spi.read_data.push_back(vec![0b0011_1100]);
    let mut ads = Ads1299::new(spi);
    assert!(ads.probe().is_ok());

    // All-ones readback, the usual symptom of a missing device.
    let mut spi = RecordingSpi::default();
    spi.read_data.push_back(vec![0xFF]);
    let mut ads = Ads1299::new(spi);
    assert!(ads.probe().is_err());
}

#[test]
fn frame_read_is_one_uninterrupted_read() {
    let mut spi = RecordingSpi::default();
    spi.read_data.push_back(vec![0xC0; 15]);
    let mut ads = Ads1299::new(spi);

    let mut frame = [0u8; 15];
    ads.read_frame(&mut frame).unwrap();
    assert_eq!(frame, [0xC0; 15]);

    let spi = ads.release();
    assert_eq!(spi.transactions, vec![vec![Op::Read(15)]]);
}
