use crate::test::*;

#[test]
fn push_pop_round_trip() {
    let (control_unit, summary) = run(&[
        (LdLit, r(R1), imm(42)),
        (Push, r(R1), none()),
        (Pop, r(R2), none()),
        (Halt, none(), none()),
    ]);

    assert_eq!(control_unit.data_path().load_reg(R2), 42);
    assert_eq!(
        control_unit.data_path().load_reg(Reg::SP),
        MEM_SIZE as i32 - 1
    );
    // LD_LIT 4 + PUSH 9 + POP 8 + HALT fetch 2.
    assert_eq!(summary.ticks, 23);
}

#[test]
fn push_writes_the_cell_then_decrements_sp() {
    let (control_unit, _) = run(&[
        (LdLit, r(R1), imm(7)),
        (Push, r(R1), none()),
        (Halt, none(), none()),
    ]);

    let top = MEM_SIZE - 1;
    assert_eq!(control_unit.data_path().word_at(top).unwrap().value(), 7);
    assert_eq!(
        control_unit.data_path().load_reg(Reg::SP),
        MEM_SIZE as i32 - 2
    );
}

#[test]
fn stack_is_last_in_first_out() {
    let (control_unit, _) = run(&[
        (LdLit, r(R1), imm(1)),
        (Push, r(R1), none()),
        (LdLit, r(R1), imm(2)),
        (Push, r(R1), none()),
        (Pop, r(R2), none()),
        (Pop, r(R3), none()),
        (Halt, none(), none()),
    ]);

    assert_eq!(control_unit.data_path().load_reg(R2), 2);
    assert_eq!(control_unit.data_path().load_reg(R3), 1);
}
