//! Challenge strings: generation and confusable-tolerant comparison.

use rand::seq::SliceRandom;
use rand::Rng;

/// Characters that stay legible under rotation and blur. Letters that are
/// easily confused with each other or with digits (`D`, `F`, `G`, `I`,
/// `J`, `L`, `O`, `Q`, `Z`, `1`) are left out.
pub const DEFAULT_ALPHABET: &str = "ABCEHKMNPRSTUVWXY023456789";

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 6;

/// Input characters accepted in place of the canonical character they
/// resemble (after uppercasing).
const ALIASES: &[(char, char)] = &[
    ('А', 'A'),
    ('В', 'B'),
    ('С', 'C'),
    ('Е', 'E'),
    ('Н', 'H'),
    ('К', 'K'),
    ('М', 'M'),
    ('Р', 'P'),
    ('Т', 'T'),
    ('Х', 'X'),
    ('У', 'Y'),
    ('З', '3'),
    ('Б', '6'),
    ('О', '0'),
    ('O', '0'),
];

fn alias_of(c: char) -> Option<char> {
    ALIASES.iter().find(|(from, _)| *from == c).map(|&(_, to)| to)
}

/// Random challenge from `alphabet` using the thread-local generator.
pub fn generate_challenge(alphabet: &str) -> String {
    generate_challenge_with_rng(alphabet, &mut rand::thread_rng())
}

/// Random challenge of 4 to 6 characters drawn from `alphabet`.
///
/// The pool holds every character twice, so a character appears at most
/// twice. It is shuffled, cut to the alphabet's length, shuffled again and
/// truncated. Alphabets shorter than six characters can yield shorter
/// strings.
pub fn generate_challenge_with_rng<R: Rng + ?Sized>(alphabet: &str, rng: &mut R) -> String {
    let chars: Vec<char> = alphabet.chars().collect();
    let mut pool: Vec<char> = chars.iter().chain(chars.iter()).copied().collect();
    pool.shuffle(rng);
    pool.truncate(chars.len());
    pool.shuffle(rng);
    let len = rng.gen_range(MIN_LENGTH..=MAX_LENGTH);
    pool.truncate(len);
    pool.into_iter().collect()
}

/// Case-insensitive comparison that also accepts known look-alike
/// characters at each position. Every position must match.
pub fn compare_challenge(expected: &str, input: &str) -> bool {
    let expected = expected.to_uppercase();
    let input = input.trim().to_uppercase();
    if expected == input {
        return true;
    }
    if expected.chars().count() != input.chars().count() {
        return false;
    }
    expected
        .chars()
        .zip(input.chars())
        .all(|(e, i)| e == i || alias_of(i) == Some(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_length_and_membership() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let s = generate_challenge_with_rng(DEFAULT_ALPHABET, &mut rng);
            let n = s.chars().count();
            assert!((MIN_LENGTH..=MAX_LENGTH).contains(&n), "{s}");
            assert!(s.chars().all(|c| DEFAULT_ALPHABET.contains(c)), "{s}");
        }
    }

    #[test]
    fn test_character_repeats_at_most_twice() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let s = generate_challenge_with_rng("ABCDEFG", &mut rng);
            for c in s.chars() {
                assert!(s.matches(c).count() <= 2, "{s}");
            }
        }
    }

    #[test]
    fn test_generation_is_replayable() {
        let a = generate_challenge_with_rng(DEFAULT_ALPHABET, &mut StdRng::seed_from_u64(9));
        let b = generate_challenge_with_rng(DEFAULT_ALPHABET, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_alphabet() {
        assert!(generate_challenge_with_rng("", &mut StdRng::seed_from_u64(1)).is_empty());
    }

    #[test]
    fn test_compare_case_insensitive() {
        assert!(compare_challenge("AB12", "ab12"));
    }

    #[test]
    fn test_compare_cyrillic_aliases() {
        assert!(compare_challenge("AB12", "АВ12"));
        assert!(compare_challenge("AB12", "ав12"));
        assert!(compare_challenge("X0Y", "хOу"));
    }

    #[test]
    fn test_compare_rejects_wrong_character() {
        assert!(!compare_challenge("AB12", "AC12"));
    }

    #[test]
    fn test_compare_rejects_length_mismatch() {
        assert!(!compare_challenge("AB12", "AB1"));
        assert!(!compare_challenge("AB12", ""));
    }

    #[test]
    fn test_alias_is_one_way() {
        // Aliases only map look-alikes onto the expected character.
        assert!(!compare_challenge("0", "Q"));
        assert!(!compare_challenge("A", "0"));
    }
}
