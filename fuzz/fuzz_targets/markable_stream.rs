#![no_main]

//! Mark/reset over a forward-only stream: every successful reset replays
//! exactly the bytes that followed the mark.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pixel_hunter::engine::MarkableReader;
use std::io::Read;

#[derive(Arbitrary, Debug)]
enum Step {
    Read(u16),
    Mark(u16),
    Reset,
}

#[derive(Arbitrary, Debug)]
struct Input {
    data: Vec<u8>,
    steps: Vec<Step>,
}

fuzz_target!(|input: Input| {
    let mut reader = MarkableReader::new(&input.data[..]);
    let mut mark = reader.save_position(0);

    for step in input.steps.iter().take(64) {
        match *step {
            Step::Read(n) => {
                let start = reader.position() as usize;
                let mut buf = Vec::new();
                reader.by_ref().take(n as u64).read_to_end(&mut buf).unwrap();
                assert_eq!(&buf[..], &input.data[start..start + buf.len()]);
            }
            Step::Mark(limit) => mark = reader.save_position(limit as usize),
            Step::Reset => {
                if reader.reset(mark).is_ok() {
                    assert_eq!(reader.position(), mark);
                }
            }
        }
    }
});
