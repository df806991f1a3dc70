use crate::test::*;

#[test]
fn ld_lit() {
    let (control_unit, summary) = run(&[(LdLit, r(R1), imm(-7)), (Halt, none(), none())]);

    assert_eq!(control_unit.data_path().load_reg(R1), -7);
    assert_eq!(summary.ticks, 6);
}

#[test]
fn ld_addr_absolute() {
    let mut memory = pad_image(
        program(&[(LdAddr, r(R1), imm(100)), (Halt, none(), none())]),
        MEM_SIZE,
    );
    memory[100] = Word::new(100, Jump, imm(77), none());

    let (control_unit, summary) = run_memory(memory, "", 100);

    assert_eq!(control_unit.data_path().load_reg(R1), 77);
    assert_eq!(summary.ticks, 7);
}

#[test]
fn ld_register_indirect() {
    let mut memory = pad_image(
        program(&[
            (LdLit, r(R1), imm(100)),
            (Ld, r(R2), r(R1)),
            (Halt, none(), none()),
        ]),
        MEM_SIZE,
    );
    memory[100] = Word::new(100, Jump, imm(55), none());

    let (control_unit, summary) = run_memory(memory, "", 100);

    assert_eq!(control_unit.data_path().load_reg(R2), 55);
    assert_eq!(summary.ticks, 12);
}

#[test]
fn ld_stack_reads_from_top_of_memory() {
    let (control_unit, summary) = run(&[
        (LdLit, r(R1), imm(42)),
        (Push, r(R1), none()),
        (LdStack, r(R2), imm(0)),
        (Halt, none(), none()),
    ]);

    assert_eq!(control_unit.data_path().load_reg(R2), 42);
    assert_eq!(summary.ticks, 21);
}

#[test]
fn mv_copies_between_registers() {
    let (control_unit, summary) = run(&[
        (LdLit, r(R1), imm(5)),
        (Mv, r(R1), r(R2)),
        (Halt, none(), none()),
    ]);

    assert_eq!(control_unit.data_path().load_reg(R1), 5);
    assert_eq!(control_unit.data_path().load_reg(R2), 5);
    assert_eq!(summary.ticks, 11);
}
