use {
    crate::*,
    nom::{
        character::complete::line_ending, combinator::map, error::Error, sequence::tuple, Err,
        IResult,
    },
};

fn comma_joined(values: &[u8]) -> String {
    values
        .iter()
        .enumerate()
        .flat_map(|(index, value)| {
            (index > 0_usize)
                .then_some(',')
                .into_iter()
                .chain([(value + b'0') as char])
        })
        .collect()
}

/// A parsed input: initial register values and the program to run them against.
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Solution {
    registers: Registers,
    program: Program,
}

impl Solution {
    fn try_run_machine(&self) -> Result<Machine, MachineError> {
        let mut machine: Machine = Machine::new(self.registers);

        machine.run(&self.program, Machine::DEFAULT_STEP_BUDGET)?;

        Ok(machine)
    }

    fn try_output_string(&self) -> Result<String, MachineError> {
        Ok(comma_joined(self.try_run_machine()?.output()))
    }

    fn try_minimal_seed(&self) -> Result<u64, SearchError> {
        try_find_minimal_seed(&self.program)
    }
}

impl Parse for Solution {
    fn parse<'i>(input: &'i str) -> IResult<&'i str, Self> {
        map(
            tuple((Registers::parse, line_ending, Program::parse)),
            |(registers, _, program)| Self { registers, program },
        )(input)
    }
}

impl RunQuestions for Solution {
    /// Registers hold values far wider than the three bits an operand can name, so the fun is all
    /// in the combo resolution.
    fn q1_internal(&mut self, args: &QuestionArgs) {
        match self.try_output_string() {
            Ok(output) => {
                dbg!(output);

                if args.verbose {
                    if let Ok(model) = DigitModel::try_new(&self.program) {
                        let modeled: String =
                            comma_joined(&model.output(self.registers.get(Register::A)));

                        dbg!(modeled);
                    }
                }
            }
            Err(error) => eprintln!("Failed to run program:\n{error:?}"),
        }
    }

    /// The emit loop eats three bits of A per pass, so the output can be rebuilt one base-8 digit
    /// at a time, starting from the digit emitted last.
    fn q2_internal(&mut self, _args: &QuestionArgs) {
        match self.try_minimal_seed() {
            Ok(seed) => {
                dbg!(seed);
            }
            Err(error) => eprintln!("Failed to find a seed:\n{error:?}"),
        }
    }
}

impl<'i> TryFrom<&'i str> for Solution {
    type Error = Err<Error<&'i str>>;

    fn try_from(input: &'i str) -> Result<Self, Self::Error> {
        Ok(Self::parse(input)?.1)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::sync::OnceLock};

    const SOLUTION_STRS: &'static [&'static str] = &[
        "\
        Register A: 0\n\
        Register B: 0\n\
        Register C: 9\n\
        \n\
        Program: 2,6\n",
        "\
        Register A: 10\n\
        Register B: 0\n\
        Register C: 0\n\
        \n\
        Program: 5,0,5,1,5,4\n",
        "\
        Register A: 2024\n\
        Register B: 0\n\
        Register C: 0\n\
        \n\
        Program: 0,1,5,4,3,0\n",
        "\
        Register A: 729\n\
        Register B: 0\n\
        Register C: 0\n\
        \n\
        Program: 0,1,5,4,3,0\n",
        "\
        Register A: 117440\n\
        Register B: 0\n\
        Register C: 0\n\
        \n\
        Program: 2,4,1,2,7,5,1,3,4,1,5,5,0,3,3,0\n",
    ];

    fn solution(index: usize) -> &'static Solution {
        static ONCE_LOCK: OnceLock<Vec<Solution>> = OnceLock::new();

        &ONCE_LOCK.get_or_init(|| {
            vec![
                Solution {
                    registers: Registers::new(0_u64, 0_u64, 9_u64),
                    program: Program::try_new(vec![2_u8, 6_u8]).unwrap(),
                },
                Solution {
                    registers: Registers::new(10_u64, 0_u64, 0_u64),
                    program: Program::try_new(vec![5_u8, 0_u8, 5_u8, 1_u8, 5_u8, 4_u8]).unwrap(),
                },
                Solution {
                    registers: Registers::new(2024_u64, 0_u64, 0_u64),
                    program: Program::try_new(vec![0_u8, 1_u8, 5_u8, 4_u8, 3_u8, 0_u8]).unwrap(),
                },
                Solution {
                    registers: Registers::new(729_u64, 0_u64, 0_u64),
                    program: Program::try_new(vec![0_u8, 1_u8, 5_u8, 4_u8, 3_u8, 0_u8]).unwrap(),
                },
                Solution {
                    registers: Registers::new(117440_u64, 0_u64, 0_u64),
                    program: Program::try_new(vec![
                        2_u8, 4_u8, 1_u8, 2_u8, 7_u8, 5_u8, 1_u8, 3_u8, 4_u8, 1_u8, 5_u8, 5_u8,
                        0_u8, 3_u8, 3_u8, 0_u8,
                    ])
                    .unwrap(),
                },
            ]
        })[index]
    }

    #[test]
    fn test_try_from_str() {
        for (index, solution_str) in SOLUTION_STRS.iter().copied().enumerate() {
            assert_eq!(
                Solution::try_from(solution_str).as_ref(),
                Ok(solution(index))
            );
        }
    }

    #[test]
    fn test_try_output_string() {
        for (index, output_str) in [
            "",
            "0,1,2",
            "4,2,5,6,7,7,7,7,3,1,0",
            "4,6,3,5,6,3,5,2,1,0",
            "1,7,7,5,5,3",
        ]
        .into_iter()
        .enumerate()
        {
            assert_eq!(
                solution(index).try_output_string(),
                Ok(output_str.to_owned())
            );
        }
    }

    #[test]
    fn test_try_minimal_seed() {
        assert_eq!(
            solution(4_usize).try_minimal_seed(),
            Ok(37221468650996_u64)
        );
        assert_eq!(
            solution(2_usize).try_minimal_seed(),
            Err(SearchError::UnsupportedProgram(
                ModelError::UnsupportedLength { len: 6_usize }
            ))
        );
    }

    #[test]
    fn test_comma_joined() {
        assert_eq!(comma_joined(&[]), String::new());
        assert_eq!(comma_joined(&[4_u8]), "4".to_owned());
        assert_eq!(comma_joined(&[4_u8, 0_u8, 7_u8]), "4,0,7".to_owned());
    }
}
