use marten_sat::{
    config::Config,
    reports::Report,
    solver::Solver,
    structures::literal::CLiteral,
};

/// The pigeonhole formula: `pigeons` pigeons into `holes` holes, no hole shared.
fn pigeonhole(solver: &mut Solver, pigeons: u32, holes: u32) {
    let mut placement = vec![vec![]; pigeons as usize];
    for pigeon in 0..pigeons {
        for _ in 0..holes {
            let atom = solver.fresh_atom(false, true);
            placement[pigeon as usize].push(CLiteral::new(atom, true));
        }
    }

    // Every pigeon is placed.
    for pigeon in 0..pigeons {
        assert!(solver.add_clause(placement[pigeon as usize].clone()).is_ok());
    }

    // No two pigeons share a hole.
    for hole in 0..holes {
        for first in 0..pigeons {
            for second in (first + 1)..pigeons {
                assert!(solver
                    .add_clause(vec![
                        -placement[first as usize][hole as usize],
                        -placement[second as usize][hole as usize],
                    ])
                    .is_ok());
            }
        }
    }
}

#[test]
fn three_into_three() {
    let mut solver = Solver::from_config(Config::default());
    pigeonhole(&mut solver, 3, 3);
    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
}

#[test]
fn four_into_three() {
    let mut solver = Solver::from_config(Config::default());
    pigeonhole(&mut solver, 4, 3);
    assert_eq!(solver.check(&[]), Ok(Report::Unsatisfiable));
}

#[test]
fn five_into_four() {
    let mut solver = Solver::from_config(Config::default());
    pigeonhole(&mut solver, 5, 4);
    assert_eq!(solver.check(&[]), Ok(Report::Unsatisfiable));
}

#[test]
fn four_into_three_without_minimization() {
    let mut config = Config::default();
    config.minimize_lemmas = false;
    config.dyn_sub_res = false;
    let mut solver = Solver::from_config(config);
    pigeonhole(&mut solver, 4, 3);
    assert_eq!(solver.check(&[]), Ok(Report::Unsatisfiable));
}

#[test]
fn restart_and_gc_policies_agree() {
    use marten_sat::config::{GcPolicy, RestartPolicy};

    for (restart, gc) in [
        (RestartPolicy::Geometric, GcPolicy::Glue),
        (RestartPolicy::Luby, GcPolicy::Psm),
        (RestartPolicy::Luby, GcPolicy::DynPsm),
    ] {
        let mut config = Config::default();
        config.restart = restart;
        config.gc = gc;
        // A small reduction threshold so the strategies actually fire.
        config.gc_initial = 2;
        config.gc_increment = 2;

        let mut solver = Solver::from_config(config);
        pigeonhole(&mut solver, 4, 3);
        assert_eq!(solver.check(&[]), Ok(Report::Unsatisfiable));
    }
}
