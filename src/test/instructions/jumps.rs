use crate::test::*;

/// Compares `lhs` with `rhs` and branches with `opcode` over a marker
/// instruction; reports whether the marker was skipped.
fn branch_skips(opcode: Opcode, lhs: i32, rhs: i32) -> bool {
    let (control_unit, summary) = run(&[
        (LdLit, r(R1), imm(lhs)),
        (LdLit, r(R2), imm(rhs)),
        (Cmp, r(R1), r(R2)),
        (opcode, imm(5), none()),
        (LdLit, r(R3), imm(1)),
        (Halt, none(), none()),
    ]);
    assert_eq!(summary.status, Status::Halted);
    control_unit.data_path().load_reg(R3) == 0
}

#[test]
fn je_on_zero_flag() {
    assert!(branch_skips(Je, 5, 5));
    assert!(!branch_skips(Je, 4, 5));
}

#[test]
fn jne_on_cleared_zero_flag() {
    assert!(branch_skips(Jne, 4, 5));
    assert!(!branch_skips(Jne, 5, 5));
}

#[test]
fn jl_on_neg_flag() {
    assert!(branch_skips(Jl, 2, 5));
    assert!(!branch_skips(Jl, 5, 5));
    assert!(!branch_skips(Jl, 5, 2));
}

#[test]
fn jle_on_neg_or_zero() {
    assert!(branch_skips(Jle, 2, 5));
    assert!(branch_skips(Jle, 5, 5));
    assert!(!branch_skips(Jle, 5, 2));
}

#[test]
fn jg_on_neither_flag() {
    assert!(branch_skips(Jg, 5, 2));
    assert!(!branch_skips(Jg, 5, 5));
    assert!(!branch_skips(Jg, 2, 5));
}

#[test]
fn jge_on_cleared_neg_or_zero() {
    assert!(branch_skips(Jge, 5, 2));
    assert!(branch_skips(Jge, 5, 5));
    assert!(!branch_skips(Jge, 2, 5));
}

#[test]
fn jump_is_unconditional() {
    let (control_unit, summary) = run(&[
        (Jump, imm(2), none()),
        (LdLit, r(R1), imm(1)),
        (Halt, none(), none()),
    ]);

    assert_eq!(control_unit.data_path().load_reg(R1), 0);
    assert_eq!(control_unit.data_path().load_reg(Reg::PC), 2);
    assert_eq!(summary.instr_count, 1);
    assert_eq!(summary.ticks, 5);
}

#[test]
fn taken_and_skipped_branches_cost_one_tick() {
    // Taken: LD_LIT 4 + LD_LIT 4 + CMP 4 + JE 3 + HALT fetch 2.
    let (_, taken) = run(&[
        (LdLit, r(R1), imm(5)),
        (LdLit, r(R2), imm(5)),
        (Cmp, r(R1), r(R2)),
        (Je, imm(5), none()),
        (LdLit, r(R3), imm(1)),
        (Halt, none(), none()),
    ]);
    assert_eq!(taken.ticks, 17);
    assert_eq!(taken.instr_count, 4);

    // Skipped: the marker LD_LIT adds 4 more ticks.
    let (_, skipped) = run(&[
        (LdLit, r(R1), imm(4)),
        (LdLit, r(R2), imm(5)),
        (Cmp, r(R1), r(R2)),
        (Je, imm(5), none()),
        (LdLit, r(R3), imm(1)),
        (Halt, none(), none()),
    ]);
    assert_eq!(skipped.ticks, 21);
    assert_eq!(skipped.instr_count, 5);
}

#[test]
fn cmp_discards_its_result() {
    let (control_unit, _) = run(&[
        (LdLit, r(R1), imm(9)),
        (LdLit, r(R2), imm(4)),
        (Cmp, r(R1), r(R2)),
        (Halt, none(), none()),
    ]);

    assert_eq!(control_unit.data_path().load_reg(R1), 9);
    assert_eq!(control_unit.data_path().load_reg(R2), 4);
    assert!(!control_unit.data_path().zero());
    assert!(!control_unit.data_path().neg());
}

#[test]
fn jump_without_target_is_invalid() {
    let (_, summary) = run(&[(Jump, none(), none())]);

    assert_eq!(summary.status, Status::InvalidInstruction);
    assert_eq!(summary.instr_count, 0);
}
