use std::sync::Arc;

use proptest::prelude::*;
use scopeline_context::{Bindings, Lookup, Snapshot, Variable};

#[derive(Debug, Clone)]
enum Step {
	/// Enter a nested extent binding variable `var` to `value`.
	Bind { var: usize, value: u32 },
	/// Leave the innermost extent.
	Exit,
}

fn arb_steps() -> impl Strategy<Value = Vec<Step>> {
	prop::collection::vec(
		prop_oneof![
			3 => (0usize..3, any::<u32>()).prop_map(|(var, value)| Step::Bind { var, value }),
			1 => Just(Step::Exit),
		],
		0..40,
	)
}

/// Replays `steps` as nested extents, checking every variable against a
/// plain stack model before each step. Returns the steps left after the
/// current extent exits.
fn replay<'a>(vars: &[Variable<u32>], mut steps: &'a [Step], model: &mut Vec<(usize, u32)>) -> Result<&'a [Step], TestCaseError> {
	loop {
		for (index, var) in vars.iter().enumerate() {
			let expected = model.iter().rev().find(|(bound, _)| *bound == index).map(|(_, value)| *value);
			prop_assert_eq!(var.get().as_deref().copied(), expected);
		}
		prop_assert_eq!(Snapshot::capture().depth(), model.len());

		let Some((step, rest)) = steps.split_first() else {
			return Ok(&[]);
		};
		match step {
			Step::Bind { var, value } => {
				model.push((*var, *value));
				let remaining = vars[*var].run(*value, || replay(vars, rest, model));
				model.pop();
				steps = remaining?;
			}
			Step::Exit => return Ok(rest),
		}
	}
}

proptest! {
	/// Nested extents resolve to the innermost binding and restore on exit.
	#[test]
	fn nested_extents_match_stack_model(steps in arb_steps()) {
		let vars: Vec<Variable<u32>> = (0..3).map(|_| Variable::new()).collect();
		let mut model = Vec::new();
		let mut remaining = steps.as_slice();
		while !remaining.is_empty() {
			remaining = replay(&vars, remaining, &mut model)?;
			prop_assert!(model.is_empty());
		}
		for var in &vars {
			prop_assert!(var.get().is_none());
		}
	}

	/// One bind call with many pairs equals the same pairs nested left to right.
	#[test]
	fn single_call_matches_nesting(pairs in prop::collection::vec((0usize..3, any::<u32>()), 0..12)) {
		let vars: Vec<Variable<u32>> = (0..3).map(|_| Variable::new()).collect();

		let flat = pairs
			.iter()
			.fold(Bindings::new(), |bindings, (var, value)| bindings.bind(&vars[*var], *value))
			.run(|| vars.iter().map(|var| var.get().as_deref().copied()).collect::<Vec<_>>());

		fn nest(vars: &[Variable<u32>], pairs: &[(usize, u32)]) -> Vec<Option<u32>> {
			match pairs.split_first() {
				Some(((var, value), rest)) => vars[*var].run(*value, || nest(vars, rest)),
				None => vars.iter().map(|var| var.get().as_deref().copied()).collect(),
			}
		}

		prop_assert_eq!(flat, nest(&vars, &pairs));
	}
}

#[test]
fn pending_bindings_report_last_duplicate() {
	let var = Variable::<u32>::with_default(0);
	let bindings = Bindings::new().bind(&var, 1).bind(&var, 2).bind(&var, 3);
	assert_eq!(bindings.get(&var), Lookup::Bound(Arc::new(3)));
}
