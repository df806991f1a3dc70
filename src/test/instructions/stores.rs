use crate::test::*;

#[test]
fn st_addr_absolute() {
    let (control_unit, summary) = run(&[
        (LdLit, r(R1), imm(55)),
        (StAddr, r(R1), imm(200)),
        (Halt, none(), none()),
    ]);

    let cell = control_unit.data_path().word_at(200).unwrap();
    assert_eq!(cell.value(), 55);
    // The store rewrites the data argument; the padding opcode survives.
    assert_eq!(cell.opcode, Jump);
    assert_eq!(summary.ticks, 12);
}

#[test]
fn st_register_indirect() {
    let (control_unit, summary) = run(&[
        (LdLit, r(R1), imm(100)),
        (LdLit, r(R2), imm(77)),
        (St, r(R2), r(R1)),
        (Halt, none(), none()),
    ]);

    assert_eq!(control_unit.data_path().word_at(100).unwrap().value(), 77);
    assert_eq!(summary.ticks, 17);
}

#[test]
fn st_stack_writes_near_top_of_memory() {
    let (control_unit, summary) = run(&[
        (LdLit, r(R1), imm(9)),
        (StStack, r(R1), imm(4)),
        (Halt, none(), none()),
    ]);

    let address = MEM_SIZE - 5;
    assert_eq!(control_unit.data_path().word_at(address).unwrap().value(), 9);
    assert_eq!(summary.ticks, 12);
}

#[test]
fn store_then_load_round_trips() {
    let (control_unit, _) = run(&[
        (LdLit, r(R1), imm(123)),
        (StAddr, r(R1), imm(300)),
        (LdAddr, r(R2), imm(300)),
        (Halt, none(), none()),
    ]);

    assert_eq!(control_unit.data_path().load_reg(R2), 123);
}
