#![no_main]

use bytestream::{ByteReader, ByteWriter};
use codec::{decode_record, decode_records, encode_record, encode_records, CodecLimits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let (head, body) = data.split_at(4);
    let [mode, strings, cells, records] = [head[0], head[1], head[2], head[3]];
    // Small limits so inputs hit every bound.
    let limits = CodecLimits {
        max_records_per_snapshot: usize::from(records % 8),
        max_cells_per_record: usize::from(cells % 32),
        max_string_bytes: usize::from(strings % 64),
    };

    let mut reader = ByteReader::new(body);
    if mode % 2 == 0 {
        let Ok(record) = decode_record(&mut reader, &limits) else {
            return;
        };
        assert!(record.id.as_str().len() <= limits.max_string_bytes);
        assert!(record.claimed_cells.len() <= limits.max_cells_per_record);

        let mut writer = ByteWriter::new();
        encode_record(&record, &mut writer, &limits).expect("decoded record re-encodes");
        let bytes = writer.finish();
        let again = decode_record(&mut ByteReader::new(&bytes), &limits).expect("re-decode");
        assert_eq!(again, record);
    } else {
        let Ok(decoded) = decode_records(&mut reader, &limits) else {
            return;
        };
        assert!(decoded.len() <= limits.max_records_per_snapshot);

        let mut writer = ByteWriter::new();
        encode_records(&decoded, &mut writer, &limits).expect("decoded snapshot re-encodes");
        let bytes = writer.finish();
        let mut again = ByteReader::new(&bytes);
        assert_eq!(decode_records(&mut again, &limits).expect("re-decode"), decoded);
        assert_eq!(again.bytes_remaining(), 0);
    }
});
