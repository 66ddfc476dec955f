use {
    crate::*,
    rayon::iter::{IntoParallelIterator, ParallelIterator},
    std::ops::Range,
};

#[derive(Debug, PartialEq)]
pub enum SearchError {
    EmptyProgram,
    UnsupportedProgram(ModelError),
    NoSolution,
}

/// One unexplored span of candidate seeds. Every candidate in `seeds` shares the base-8 digits
/// fixed at shallower depths; `index` addresses the expected digit the span is deciding.
struct Frame {
    seeds: Range<u64>,
    index: usize,
}

/// Ordered depth-first scan below a single root span.
///
/// The expected sequence is the program reversed: the digit emitted last depends only on the most
/// significant base-8 digit of the seed, so the scan fixes digits most-significant-first and
/// extends a candidate by one digit per level. When a candidate matches mid-depth, its remaining
/// siblings are pushed before its child span, so LIFO popping walks the tree in candidate order
/// and the first full-depth match is the smallest seed under this root.
fn root_minimal_seed(expected: &[u8], model: DigitModel, root: Frame) -> Option<u64> {
    let last_index: usize = expected.len() - 1_usize;
    let mut frames: Vec<Frame> = vec![root];

    while let Some(Frame { seeds, index }) = frames.pop() {
        for seed in seeds.clone() {
            if model.digit(seed) != expected[index] {
                continue;
            }

            if index == last_index {
                // The zero seed only reaches full depth for a single-pair program, and an empty
                // output never matches a non-empty one.
                if seed > 0_u64 {
                    return Some(seed);
                }
            } else {
                frames.push(Frame {
                    seeds: seed + 1_u64..seeds.end,
                    index,
                });
                frames.push(Frame {
                    seeds: seed << Program::BITS..(seed + 1_u64) << Program::BITS,
                    index: index + 1_usize,
                });

                break;
            }
        }
    }

    None
}

/// The smallest positive seed for register A that makes the program emit itself.
///
/// Only defined for programs the digit model replicates; anything else is rejected up front. The
/// eight roots are independent, so they run in parallel; taking the minimum over their results
/// matches the sequential smallest-digit-first answer, because full-depth candidates are
/// fixed-width base-8 digit strings and lexicographic order on those is numeric order.
pub fn try_find_minimal_seed(program: &Program) -> Result<u64, SearchError> {
    if program.is_empty() {
        return Err(SearchError::EmptyProgram);
    }

    let model: DigitModel = DigitModel::try_new(program).map_err(SearchError::UnsupportedProgram)?;
    let expected: Vec<u8> = program.iter().copied().rev().collect();

    (0_u64..Program::VALUE_COUNT as u64)
        .into_par_iter()
        .filter_map(|digit| {
            root_minimal_seed(
                &expected,
                model,
                Frame {
                    seeds: digit..digit + 1_u64,
                    index: 0_usize,
                },
            )
        })
        .min()
        .ok_or(SearchError::NoSolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_program(shift_xor: u8, output_xor: u8) -> Program {
        Program::try_new(vec![
            2_u8, 4_u8, 1_u8, shift_xor, 7_u8, 5_u8, 1_u8, output_xor, 4_u8, 1_u8, 5_u8, 5_u8,
            0_u8, 3_u8, 3_u8, 0_u8,
        ])
        .unwrap()
    }

    #[test]
    fn test_try_find_minimal_seed() {
        for (shift_xor, output_xor, seed) in [
            (1_u8, 5_u8, 164278764924605_u64),
            (2_u8, 3_u8, 37221468650996_u64),
            (5_u8, 6_u8, 107413700225434_u64),
        ] {
            let program: Program = layout_program(shift_xor, output_xor);

            assert_eq!(try_find_minimal_seed(&program), Ok(seed));
        }
    }

    #[test]
    fn test_found_seed_reproduces_program() {
        let program: Program = layout_program(2_u8, 3_u8);
        let seed: u64 = try_find_minimal_seed(&program).unwrap();

        assert_eq!(
            DigitModel::try_new(&program).unwrap().output(seed),
            *program
        );

        let mut machine: Machine = Machine::new(Registers::new(seed, 0_u64, 0_u64));

        machine.run(&program, Machine::DEFAULT_STEP_BUDGET).unwrap();

        assert_eq!(machine.output(), &program[..]);
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(
            try_find_minimal_seed(&Program::try_new(Vec::new()).unwrap()),
            Err(SearchError::EmptyProgram)
        );
    }

    #[test]
    fn test_unsupported_program() {
        assert_eq!(
            try_find_minimal_seed(
                &Program::try_new(vec![0_u8, 1_u8, 5_u8, 4_u8, 3_u8, 0_u8]).unwrap()
            ),
            Err(SearchError::UnsupportedProgram(
                ModelError::UnsupportedLength { len: 6_usize }
            ))
        );
    }

    #[test]
    fn test_no_solution() {
        // No candidate digit matches at the root: every branch dies at depth zero.
        assert_eq!(
            try_find_minimal_seed(&layout_program(1_u8, 0_u8)),
            Err(SearchError::NoSolution)
        );

        // Some roots survive a few levels before exhausting.
        assert_eq!(
            try_find_minimal_seed(&layout_program(6_u8, 7_u8)),
            Err(SearchError::NoSolution)
        );
    }
}
