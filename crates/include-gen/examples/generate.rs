use std::fs::File;
use std::io::BufWriter;

use include_gen::{GenOptions, Generator};

fn main() {
    let mut args = std::env::args().skip(1);
    let (input, source, header) = match (args.next(), args.next(), args.next()) {
        (Some(input), Some(source), Some(header)) => (input, source, header),
        _ => panic!("USAGE: generate <input> <out.c> <out.h>"),
    };

    let data = std::fs::read(&input).expect("could not read input file");
    let source = File::create(source).expect("could not create source file");
    let header = File::create(header).expect("could not create include file");

    let mut gen = Generator::new(
        GenOptions::new(),
        BufWriter::new(source),
        BufWriter::new(header),
    )
    .expect("failed to start generation");
    gen.add(&input, &data).expect("failed to emit file");
    gen.finish().expect("failed to finish generation");
}
