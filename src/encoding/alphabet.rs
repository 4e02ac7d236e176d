//! Nucleotide compatibility alphabet.
//!
//! Scores a (gene nucleotide, miRNA nucleotide) pair. Only the canonical
//! Watson–Crick pairs score; every other combination, including anything
//! outside {A, C, G, T, U}, scores zero.

/// Two-character keys (gene nucleotide first) and their scores.
pub const COMPATIBILITY: [(&str, f32); 6] = [
    ("AT", 1.0),
    ("TA", 1.0),
    ("GC", 1.0),
    ("CG", 1.0),
    ("AU", 1.0),
    ("UA", 1.0),
];

/// Looks up a two-character key in the table. Keys are matched exactly;
/// callers normalize case first.
pub fn lookup(key: &str) -> Option<f32> {
    COMPATIBILITY
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, score)| score)
}

/// Size of the A/C/G/T/U key alphabet.
const NUCLEOTIDES: usize = 5;

const fn nucleotide_index(b: u8) -> Option<usize> {
    match b {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        b'U' => Some(4),
        _ => None,
    }
}

/// `COMPATIBILITY` laid out as a dense [gene][mirna] grid.
const SCORES: [[f32; NUCLEOTIDES]; NUCLEOTIDES] = score_grid();

const fn score_grid() -> [[f32; NUCLEOTIDES]; NUCLEOTIDES] {
    let mut grid = [[0.0; NUCLEOTIDES]; NUCLEOTIDES];
    let mut i = 0;
    while i < COMPATIBILITY.len() {
        let (key, score) = COMPATIBILITY[i];
        let key = key.as_bytes();
        if key.len() != 2 {
            panic!("compatibility keys are two nucleotides");
        }
        match (nucleotide_index(key[0]), nucleotide_index(key[1])) {
            (Some(g), Some(m)) => grid[g][m] = score,
            _ => panic!("compatibility key outside A/C/G/T/U"),
        }
        i += 1;
    }
    grid
}

fn char_index(c: char) -> Option<usize> {
    if c.is_ascii() {
        nucleotide_index(c as u8)
    } else {
        None
    }
}

/// Score for an already-uppercased pair, read from `COMPATIBILITY` without
/// building the key string.
#[inline]
pub fn pair_score(gene: char, mirna: char) -> f32 {
    match (char_index(gene), char_index(mirna)) {
        (Some(g), Some(m)) => SCORES[g][m],
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTERS: [char; 8] = ['A', 'C', 'G', 'T', 'U', 'N', 'X', '-'];

    #[test]
    fn pair_score_agrees_with_table() {
        for &g in LETTERS.iter() {
            for &m in LETTERS.iter() {
                let key: String = [g, m].iter().collect();
                assert_eq!(
                    pair_score(g, m),
                    lookup(&key).unwrap_or(0.0),
                    "mismatch for {}",
                    key
                );
            }
        }
    }

    #[test]
    fn wobble_and_self_pairs_do_not_score() {
        assert_eq!(pair_score('G', 'U'), 0.0);
        assert_eq!(pair_score('U', 'G'), 0.0);
        assert_eq!(pair_score('T', 'U'), 0.0);
        assert_eq!(pair_score('A', 'A'), 0.0);
    }

    #[test]
    fn every_table_entry_reaches_pair_score() {
        for &(key, score) in COMPATIBILITY.iter() {
            let mut chars = key.chars();
            let (g, m) = (chars.next().unwrap(), chars.next().unwrap());
            assert_eq!(pair_score(g, m), score, "{}", key);
        }
        let scoring = LETTERS
            .iter()
            .flat_map(|&g| LETTERS.iter().map(move |&m| (g, m)))
            .filter(|&(g, m)| pair_score(g, m) != 0.0)
            .count();
        assert_eq!(scoring, COMPATIBILITY.len());
    }

    #[test]
    fn pair_score_expects_uppercase() {
        assert_eq!(pair_score('a', 't'), 0.0);
        assert_eq!(pair_score('\u{e9}', 'A'), 0.0);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(lookup("AT"), Some(1.0));
        assert_eq!(lookup("at"), None);
        assert_eq!(lookup("A"), None);
    }
}
