use crate::test::*;

fn binary(opcode: Opcode, lhs: i32, rhs: i32) -> (ControlUnit, RunSummary) {
    run(&[
        (LdLit, r(R1), imm(lhs)),
        (LdLit, r(R2), imm(rhs)),
        (opcode, r(R1), r(R2)),
        (Halt, none(), none()),
    ])
}

#[test]
fn add_into_first_operand() {
    let (control_unit, summary) = binary(Add, 5, 3);

    assert_eq!(control_unit.data_path().load_reg(R1), 8);
    assert_eq!(control_unit.data_path().load_reg(R2), 3);
    assert_eq!(summary.ticks, 15);
}

#[test]
fn sub() {
    let (control_unit, _) = binary(Sub, 5, 8);

    assert_eq!(control_unit.data_path().load_reg(R1), -3);
    assert!(control_unit.data_path().neg());
}

#[test]
fn mul() {
    let (control_unit, _) = binary(Mul, 6, 7);

    assert_eq!(control_unit.data_path().load_reg(R1), 42);
}

#[test]
fn div_truncates_toward_zero() {
    let (control_unit, _) = binary(Div, 7, 2);
    assert_eq!(control_unit.data_path().load_reg(R1), 3);

    let (control_unit, _) = binary(Div, -7, 2);
    assert_eq!(control_unit.data_path().load_reg(R1), -3);
}

#[test]
fn div_by_zero_stops_the_machine() {
    let (_, summary) = binary(Div, 1, 0);

    assert_eq!(summary.status, Status::DivisionByZero);
}

#[test]
fn bitwise_and_shifts() {
    let (control_unit, _) = binary(And, 12, 10);
    assert_eq!(control_unit.data_path().load_reg(R1), 8);

    let (control_unit, _) = binary(Or, 12, 10);
    assert_eq!(control_unit.data_path().load_reg(R1), 14);

    let (control_unit, _) = binary(Xor, 12, 10);
    assert_eq!(control_unit.data_path().load_reg(R1), 6);

    let (control_unit, _) = binary(Shl, 1, 4);
    assert_eq!(control_unit.data_path().load_reg(R1), 16);

    let (control_unit, _) = binary(Shr, 16, 2);
    assert_eq!(control_unit.data_path().load_reg(R1), 4);
}

#[test]
fn add_lit_overflow_sets_carry() {
    let (control_unit, summary) = run(&[
        (LdLit, r(R1), imm(i32::MAX)),
        (AddLit, r(R1), imm(1)),
        (Halt, none(), none()),
    ]);

    assert_eq!(control_unit.data_path().load_reg(R1), i32::MIN);
    assert!(control_unit.data_path().carry());
    assert!(control_unit.data_path().neg());
    assert_eq!(summary.ticks, 11);
}

#[test]
fn inc_and_dec() {
    let (control_unit, summary) = run(&[
        (LdLit, r(R1), imm(-1)),
        (Inc, r(R1), none()),
        (Dec, r(R2), none()),
        (Halt, none(), none()),
    ]);

    assert_eq!(control_unit.data_path().load_reg(R1), 0);
    assert_eq!(control_unit.data_path().load_reg(R2), -1);
    // LD_LIT 4 + INC 5 + DEC 5 + HALT fetch 2.
    assert_eq!(summary.ticks, 16);
}

#[test]
fn neg_flips_bits() {
    let (control_unit, summary) = run(&[(Neg, r(R1), none()), (Halt, none(), none())]);

    assert_eq!(control_unit.data_path().load_reg(R1), -1);
    assert_eq!(summary.ticks, 7);
}
