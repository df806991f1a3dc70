use super::*;

use tcpu::constants::MEM_SIZE;
use tcpu::{Arg, Opcode, Reg};

fn sample_code() -> Vec<Word> {
    vec![
        Word::new(0, Opcode::LdLit, Arg::Reg(Reg::R9), Arg::Imm(5)),
        Word::new(1, Opcode::Push, Arg::Reg(Reg::R9), Arg::None),
        Word::new(2, Opcode::Pop, Arg::Reg(Reg::R9), Arg::None),
        Word::new(3, Opcode::StAddr, Arg::Reg(Reg::R9), Arg::Imm(36)),
        Word::new(4, Opcode::Halt, Arg::None, Arg::None),
    ]
}

#[test]
fn write_read() {
    let code = sample_code();

    let mut buffer = Vec::new();
    write_code(&mut buffer, &code).unwrap();
    let image = read_code(&mut buffer.as_slice(), MEM_SIZE).unwrap();

    assert_eq!(image.len(), MEM_SIZE);
    assert_eq!(&image[..code.len()], &code[..]);
    for (address, word) in image.iter().enumerate().skip(code.len()) {
        assert_eq!(*word, Word::padding(address as u32));
    }
}

#[test]
fn record_format() {
    let code = vec![Word::new(0, Opcode::LdLit, Arg::Reg(Reg::R9), Arg::Imm(5))];

    let mut buffer = Vec::new();
    write_code(&mut buffer, &code).unwrap();

    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        r#"[{"index":0,"opcode":"LD_LIT","arg1":"r9","arg2":5}]"#
    );
}

#[test]
fn records_on_separate_lines() {
    let mut buffer = Vec::new();
    write_code(&mut buffer, &sample_code()).unwrap();
    let text = String::from_utf8(buffer).unwrap();

    assert!(text.starts_with('['));
    assert!(text.ends_with(']'));
    assert_eq!(text.lines().count(), 5);
}

#[test]
fn unresolved_label_rejected() {
    let code = vec![Word::new(0, Opcode::LdLit, Arg::Reg(Reg::R12), Arg::Label)];

    let mut buffer = Vec::new();
    assert!(matches!(
        write_code(&mut buffer, &code),
        Err(Error::Unresolved(0))
    ));
}

#[test]
fn unresolved_data_offset_rejected() {
    let code = vec![Word::new(0, Opcode::LdAddr, Arg::Reg(Reg::R1), Arg::Data(3))];

    let mut buffer = Vec::new();
    assert!(matches!(
        write_code(&mut buffer, &code),
        Err(Error::Unresolved(0))
    ));
}

#[test]
fn mismatched_index_rejected() {
    let text = r#"[{"index":1,"opcode":"HALT","arg1":null,"arg2":null}]"#;

    let result = read_code(&mut text.as_bytes(), MEM_SIZE);
    assert!(matches!(
        result,
        Err(Error::BadIndex {
            expected: 0,
            found: 1
        })
    ));
}

#[test]
fn unknown_register_rejected() {
    let text = r#"[{"index":0,"opcode":"MV","arg1":"r16","arg2":"r9"}]"#;

    assert!(matches!(
        read_code(&mut text.as_bytes(), MEM_SIZE),
        Err(Error::Json(_))
    ));
}

#[test]
fn oversized_image_rejected() {
    let code: Vec<Word> = (0..5).map(Word::padding).collect();

    let mut buffer = Vec::new();
    write_code(&mut buffer, &code).unwrap();
    assert!(matches!(
        read_code(&mut buffer.as_slice(), 4),
        Err(Error::TooLarge(5))
    ));
}

#[test]
fn file_round_trip() {
    let path = std::env::temp_dir().join("timage_file_round_trip.json");
    let code = sample_code();

    write_file(&path, &code).unwrap();
    let image = read_file(&path, MEM_SIZE).unwrap();

    assert_eq!(&image[..code.len()], &code[..]);
    assert_eq!(image.len(), MEM_SIZE);

    std::fs::remove_file(&path).unwrap();
}
