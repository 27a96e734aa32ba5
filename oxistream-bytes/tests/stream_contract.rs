//! End-to-end tests of the reader/writer contracts across backends.

use std::io::{Read as _, Seek as _, SeekFrom, Write as _};

use bytes::Bytes;
use oxistream_bytes::prelude::*;
use oxistream_bytes::{
    ChainReader, FileReader, FileWriter, SliceReader, StreamReader, StreamWriter, VecWriter,
    WriterFile,
};

#[test]
fn in_memory_round_trip() {
    let mut writer = StreamWriter::new(Vec::new());
    writer.write(b"hello\x00world").unwrap();
    let bytes = writer.into_inner().unwrap();
    assert_eq!(bytes.len(), 11);

    let mut reader = SliceReader::new(bytes);
    let mut dest = [0u8; 11];
    assert_eq!(reader.read(&mut dest).unwrap(), 11);
    assert_eq!(&dest, b"hello\x00world");
    assert!(!reader.pull(1, 1).unwrap());
    assert!(reader.ok());
}

#[test]
fn copy_between_reader_and_writer() {
    let data: Vec<u8> = (0..100_000u32).map(|i| (i * 7) as u8).collect();
    let mut reader = StreamReader::new(std::io::Cursor::new(data.clone()));
    let mut writer = StreamWriter::new(Vec::new());
    let copied = reader.copy_to(data.len() as Position, &mut writer).unwrap();
    assert_eq!(copied, data.len() as Position);
    assert_eq!(writer.into_inner().unwrap(), data);
}

#[test]
fn copy_stops_at_reader_end() {
    let mut reader = SliceReader::new(b"short".as_slice());
    let mut writer = VecWriter::new();
    assert_eq!(reader.copy_to(100, &mut writer).unwrap(), 5);
    assert!(reader.ok());
    assert_eq!(writer.into_vec(), b"short");
}

#[test]
fn chain_pipeline_shares_blocks() {
    let mut chain = Chain::new();
    chain.push_block(Bytes::from(vec![0xAA; 2000]));
    chain.push_block(Bytes::from_static(b"tail"));

    let mut reader = ChainReader::new(chain);
    let mut collected = Chain::new();
    assert_eq!(reader.read_chain(2004, &mut collected).unwrap(), 2004);
    assert_eq!(collected.len(), 2004);
    // The large block travelled as a shared reference.
    assert!(collected.blocks().iter().any(|b| b.len() == 2000));

    let mut writer = VecWriter::new();
    writer.write_chain(&collected).unwrap();
    let out = writer.into_vec();
    assert_eq!(out.len(), 2004);
    assert_eq!(&out[2000..], b"tail");
}

#[test]
fn pull_granularity_is_invisible() {
    // The byte sequence is independent of how the caller pulls.
    let mut chain = Chain::new();
    for block in [&b"frag"[..], b"mented", b" ", b"chain", b"!"] {
        chain.push_block(Bytes::copy_from_slice(block));
    }
    let expected = b"fragmented chain!";

    for granularity in 1..=expected.len() {
        let mut reader = ChainReader::new(chain.clone());
        let mut seen = Vec::new();
        loop {
            if reader.available() == 0
                && !reader.pull(granularity, granularity).unwrap()
                && reader.available() == 0
            {
                break;
            }
            let take = reader.available().min(granularity);
            seen.extend_from_slice(&reader.chunk()[..take]);
            reader.advance(take);
        }
        assert_eq!(seen, expected, "granularity {granularity}");
    }
}

#[test]
fn file_round_trip_with_flush() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.bin");

    let mut writer = FileWriter::create(&path).unwrap();
    let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    writer.write(&payload).unwrap();
    writer.flush(FlushMode::FromProcess).unwrap();

    // The flushed prefix is observable through an independent reader.
    let mut reader = FileReader::open(&path).unwrap();
    let mut dest = vec![0u8; payload.len()];
    assert_eq!(reader.read(&mut dest).unwrap(), payload.len());
    assert_eq!(dest, payload);

    writer.close().unwrap();
    reader.close().unwrap();
}

#[test]
fn file_reader_discovers_size_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sized.bin");
    std::fs::write(&path, vec![0x42; 4096]).unwrap();

    let mut reader = FileReader::open(&path).unwrap();
    assert!(reader.supports_random_access());
    assert_eq!(reader.size().unwrap(), 4096);
    assert!(reader.seek(4000).unwrap());
    let mut dest = [0u8; 100];
    assert_eq!(reader.read(&mut dest).unwrap(), 96);
    assert!(reader.ok());
}

#[test]
fn growing_file_is_not_capped_at_first_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("growing.log");
    std::fs::write(&path, b"first").unwrap();

    let mut reader = FileReader::with_options(
        std::fs::File::open(&path).unwrap(),
        ReaderOptions::new().with_growing_source(true),
    );
    let mut dest = [0u8; 16];
    assert_eq!(reader.read(&mut dest).unwrap(), 5);
    assert_eq!(&dest[..5], b"first");
    assert!(!reader.pull(1, 1).unwrap());

    // The file grows; a growing source finds the new bytes.
    let mut appender = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    appender.write_all(b"second").unwrap();
    appender.flush().unwrap();

    assert!(reader.pull(1, 1).unwrap());
    assert_eq!(reader.read(&mut dest).unwrap(), 6);
    assert_eq!(&dest[..6], b"second");
}

#[test]
fn fixed_file_caches_its_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixed.bin");
    std::fs::write(&path, b"first").unwrap();

    let mut reader = FileReader::open(&path).unwrap();
    let mut dest = [0u8; 16];
    assert_eq!(reader.read(&mut dest).unwrap(), 5);
    assert!(!reader.pull(1, 1).unwrap());

    let mut appender = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    appender.write_all(b"second").unwrap();
    appender.flush().unwrap();

    // Not declared growing: the discovered end is authoritative.
    assert!(!reader.pull(1, 1).unwrap());
    assert!(reader.ok());
}

#[test]
fn writer_file_adapter_over_a_real_sink() {
    let mut file = WriterFile::new(VecWriter::new());
    file.write_all(b"record one\n").unwrap();
    file.write_all(b"record two\n").unwrap();

    // Read the first record back, then append a third.
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut line = [0u8; 11];
    file.read_exact(&mut line).unwrap();
    assert_eq!(&line, b"record one\n");
    file.seek(SeekFrom::End(0)).unwrap();
    file.write_all(b"record three\n").unwrap();

    let out = file.into_writer().into_vec();
    assert_eq!(out, b"record one\nrecord two\nrecord three\n");
}

#[test]
fn read_mode_round_trip() {
    let payload: Vec<u8> = (0..500u32).map(|i| (i % 241) as u8).collect();
    let mut writer = VecWriter::new();
    writer.write(&payload).unwrap();

    let mut view = writer.read_mode(0).unwrap();
    let mut dest = vec![0u8; payload.len()];
    assert_eq!(view.read(&mut dest).unwrap(), payload.len());
    assert_eq!(dest, payload);
    assert!(!view.pull(1, 1).unwrap());
}

#[test]
fn positions_remain_consistent_across_operations() {
    let mut reader = StreamReader::with_options(
        std::io::Cursor::new(vec![1u8; 1000]),
        ReaderOptions::new().with_buffer_size(64),
    );
    let mut consumed: Position = 0;
    let mut dest = [0u8; 33];
    while reader.pull(1, dest.len()).unwrap() {
        let take = reader.available().min(dest.len());
        reader.read(&mut dest[..take]).unwrap();
        consumed += take as Position;
        assert_eq!(reader.pos(), consumed);
        assert!(reader.start_pos() <= reader.pos());
        assert!(reader.pos() <= reader.limit_pos());
        assert_eq!(
            reader.limit_pos() - reader.pos(),
            reader.available() as Position
        );
    }
    assert_eq!(consumed, 1000);
}
