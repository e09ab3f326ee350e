#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate huffcode;
use huffcode::{load_code_table, Decoder};

fuzz_target!(|data: &[u8]| {
    // first line of garbage is the table, the rest is the bit stream
    let split = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let (table, bits) = data.split_at(split);
    if let Ok((tree, _)) = load_code_table(table) {
        // cap the output so huge claimed frequencies don't exhaust memory
        if tree.frequency() <= 1 << 20 {
            let _ = Decoder::new(&tree).decode(bits, std::io::sink());
        }
    }
    /* errors are fine, it just should never panic on invalid input */
});
