use crate::test::*;

#[test]
fn read_then_print_echoes_a_character() {
    let (control_unit, summary) = run_with(
        &[
            (Read, r(R1), imm(0)),
            (Print, r(R1), imm(0)),
            (Halt, none(), none()),
        ],
        "A",
        100,
    );

    assert_eq!(control_unit.data_path().output(0), "A");
    // READ 4 + PRINT 5 + HALT fetch 2.
    assert_eq!(summary.ticks, 11);
}

#[test]
fn print_emits_the_character_with_the_register_code() {
    let (control_unit, _) = run(&[
        (LdLit, r(R1), imm(35)),
        (Print, r(R1), imm(0)),
        (Halt, none(), none()),
    ]);

    assert_eq!(control_unit.data_path().output(0), "#");
}

#[test]
fn input_port_is_first_in_first_out() {
    let (control_unit, _) = run_with(
        &[
            (Read, r(R1), imm(0)),
            (Read, r(R2), imm(0)),
            (Halt, none(), none()),
        ],
        "ab",
        100,
    );

    assert_eq!(control_unit.data_path().load_reg(R1), 'a' as i32);
    assert_eq!(control_unit.data_path().load_reg(R2), 'b' as i32);
}

#[test]
fn read_on_empty_input_terminates() {
    let (_, summary) = run_with(&[(Read, r(R1), imm(0)), (Halt, none(), none())], "", 100);

    assert_eq!(summary.status, Status::InputExhausted);
    assert_eq!(summary.instr_count, 0);
    // Only the fetch happened.
    assert_eq!(summary.ticks, 2);
}

#[test]
fn pick_char_returns_zero_on_an_empty_queue() {
    let mut data_path = DataPath::new(pad_image(Vec::new(), 16), Vec::new());

    assert_eq!(data_path.pick_char(0), 0);
}
