#![no_main]

use libfuzzer_sys::fuzz_target;
use flatscope::{FlatWriter, InwardBuffer, Position, TableMark, VectorMark, WriterConfig};

enum Open {
    Table(TableMark),
    Vector(VectorMark, usize),
}

// Interprets the input as writer calls; any sequence may fail but must never panic.
fuzz_target!(|data: &[u8]| {
    let mut buffer = InwardBuffer::with_capacity(16);
    let mut writer = FlatWriter::new(&mut buffer, WriterConfig::strict());
    let mut open = Vec::new();
    let mut last = Position::NULL;

    for chunk in data.chunks(2) {
        let (op, arg) = (chunk[0], chunk.get(1).copied().unwrap_or(0));
        let field = u16::from(arg % 16) * 2;

        let result = match op % 10 {
            0 => writer.start_table().map(|mark| open.push(Open::Table(mark))),
            1 => writer.start_vector().map(|mark| open.push(Open::Vector(mark, 0))),
            2 => match open.pop() {
                Some(Open::Table(mark)) => writer.end_table(mark).map(|position| last = position),
                Some(Open::Vector(mark, count)) => {
                    writer.end_vector(mark, count).map(|position| last = position)
                }
                None => Ok(()),
            },
            3 => writer.scalar(field, u32::from(arg), 0),
            4 => writer.scalar(field, u64::from(arg), 7),
            5 => writer.string(field, &"x".repeat(usize::from(arg))),
            6 => writer.reference(field, last),
            7 => match open.last_mut() {
                Some(Open::Vector(_, count)) => writer.add_vector_value(u32::from(arg)).map(|()| *count += 1),
                _ => writer.add_vector_value(u32::from(arg)),
            },
            8 => match open.last_mut() {
                Some(Open::Vector(_, count)) if !last.is_null() => {
                    writer.add_vector_reference(last).map(|()| *count += 1)
                }
                _ => writer.create_string("leaf").map(|position| last = position),
            },
            _ => writer.create_vector_of_scalars(&[arg, op]).map(|position| last = position),
        };

        if result.is_err() {
            return;
        }
    }

    if open.is_empty() && !last.is_null() {
        if let Ok(bytes) = writer.finish(last) {
            let root = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
            assert!(root < bytes.len());
        }
    }
});
