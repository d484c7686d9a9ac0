use crate::bitset::BitSet128;
use crate::fa::{Automaton, StateId, ERROR_STATE, EPSILON};

/// Runs an [`Automaton`] over input text with maximal munch semantics:
/// every match is the longest prefix the automaton accepts.
///
/// Deterministic automata are walked state by state, rolling back to the
/// last accepting state once the walk falls into the error state.
/// Non-deterministic ones are simulated by tracking the set of states the
/// automaton could be in.
#[derive(Debug)]
pub struct Matcher<'a> {
    fa: &'a Automaton,
    deterministic: bool,
}

/// A match, as the byte range `start..end` of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub start: usize,
    pub end: usize,
}

impl MatchResult {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The matched text.
    pub fn as_str<'i>(&self, input: &'i str) -> &'i str {
        &input[self.start..self.end]
    }
}

impl<'a> Matcher<'a> {
    /// Create a new matcher for the given automaton.
    pub fn new(fa: &'a Automaton) -> Self {
        Self { fa, deterministic: fa.is_deterministic() }
    }

    /// Check if the entire input matches.
    pub fn is_match(&self, input: &str) -> bool {
        self.longest_match(input) == Some(input.len())
    }

    /// Returns the length in bytes of the longest prefix of `input`
    /// accepted by the automaton, or `None` if no prefix is accepted. Note
    /// that `Some(0)` means the automaton accepts the empty string.
    pub fn longest_match(&self, input: &str) -> Option<usize> {
        self.longest_prefix(input.as_bytes())
    }

    /// Finds the non-overlapping, non-empty longest matches from left to
    /// right. When nothing matches at some position the search resumes one
    /// byte later.
    pub fn find_all(&self, input: &str) -> Vec<MatchResult> {
        let bytes = input.as_bytes();
        let mut matches = Vec::new();
        let mut start = 0;

        while start < bytes.len() {
            match self.longest_prefix(&bytes[start..]) {
                Some(len) if len > 0 => {
                    matches.push(MatchResult { start, end: start + len });
                    start += len;
                }
                _ => start += 1,
            }
        }

        matches
    }

    fn longest_prefix(&self, input: &[u8]) -> Option<usize> {
        if self.fa.initial_state() == ERROR_STATE {
            return None;
        }
        if self.deterministic {
            self.longest_prefix_dfa(input)
        } else {
            self.longest_prefix_nfa(input)
        }
    }

    fn longest_prefix_dfa(&self, input: &[u8]) -> Option<usize> {
        // States visited since the last accepting one, each with the
        // number of bytes consumed to reach it.
        let mut stack: Vec<(StateId, usize)> = Vec::new();
        let mut state = self.fa.initial_state();
        let mut consumed = 0;

        loop {
            if self.fa.is_accepting(state) {
                stack.clear();
            }
            stack.push((state, consumed));

            let byte = match input.get(consumed) {
                Some(&byte) => byte,
                None => break,
            };
            state = self.fa.next_state_dfa(state, byte);
            if state == ERROR_STATE {
                break;
            }
            consumed += 1;
        }

        // Roll back to the last accepting state, if any.
        while let Some((state, consumed)) = stack.pop() {
            if self.fa.is_accepting(state) {
                return Some(consumed);
            }
        }

        None
    }

    fn longest_prefix_nfa(&self, input: &[u8]) -> Option<usize> {
        let mut buf = Vec::new();
        let initial = BitSet128::new(self.fa.initial_state() as u8);
        let mut current = self.epsilon_closure(initial, &mut buf);
        let mut longest = None;
        let mut consumed = 0;

        loop {
            if !(current & self.fa.accepting()).is_empty() {
                longest = Some(consumed);
            }

            let byte = match input.get(consumed) {
                Some(&byte) => byte,
                None => break,
            };
            let next = self.step_states(current, byte, &mut buf);
            if next.is_empty() {
                break;
            }
            current = self.epsilon_closure(next, &mut buf);
            consumed += 1;
        }

        longest
    }

    /// Adds to `states` every state reachable from them through epsilon
    /// transitions.
    fn epsilon_closure(
        &self,
        states: BitSet128,
        buf: &mut Vec<StateId>,
    ) -> BitSet128 {
        let mut closure = states;
        let mut pending: Vec<StateId> =
            states.iter().map(StateId::from).collect();

        while let Some(state) = pending.pop() {
            self.fa.next_state_nfa(state, EPSILON, buf);
            for &next in buf.iter() {
                let next_set = BitSet128::new(next as u8);
                if (closure & next_set).is_empty() {
                    closure = closure | next_set;
                    pending.push(next);
                }
            }
        }

        closure
    }

    /// Returns the states reached from `states` on `byte`.
    fn step_states(
        &self,
        states: BitSet128,
        byte: u8,
        buf: &mut Vec<StateId>,
    ) -> BitSet128 {
        let mut next_states = BitSet128::empty();
        for state in states {
            self.fa.next_state_nfa(StateId::from(state), byte, buf);
            next_states = buf
                .iter()
                .fold(next_states, |set, &next| set | BitSet128::new(next as u8));
        }
        next_states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use quickcheck::quickcheck;

    /// {ab, abcd}, deterministic.
    fn ab_abcd() -> Automaton {
        let mut fa = Automaton::new();
        fa.add_states(5);
        fa.add_transition(1, b'a', 2);
        fa.add_transition(2, b'b', 3);
        fa.add_transition(3, b'c', 4);
        fa.add_transition(4, b'd', 5);
        fa.set_initial_state(1);
        fa.set_accepting(3, true);
        fa.set_accepting(5, true);
        fa
    }

    /// a(a|b)*, deterministic.
    fn a_then_ab() -> Automaton {
        let mut fa = Automaton::new();
        fa.add_states(2);
        fa.add_transition(1, b'a', 2);
        fa.add_transition(2, b'a', 2);
        fa.add_transition(2, b'b', 2);
        fa.set_initial_state(1);
        fa.set_accepting(2, true);
        fa
    }

    #[test]
    fn dfa_rollback() {
        let fa = ab_abcd();
        let matcher = Matcher::new(&fa);

        assert!(matcher.deterministic);
        assert_eq!(matcher.longest_match("abcd"), Some(4));
        assert_eq!(matcher.longest_match("abcdx"), Some(4));
        assert_eq!(matcher.longest_match("abcx"), Some(2));
        assert_eq!(matcher.longest_match("abc"), Some(2));
        assert_eq!(matcher.longest_match("a"), None);
        assert_eq!(matcher.longest_match(""), None);
        assert!(matcher.is_match("ab"));
        assert!(!matcher.is_match("abc"));
    }

    #[test]
    fn nfa_longest_match() {
        let fa = compile("ab|abcd").unwrap();
        let matcher = Matcher::new(&fa);

        assert!(!matcher.deterministic);
        assert_eq!(matcher.longest_match("abcd"), Some(4));
        assert_eq!(matcher.longest_match("abcx"), Some(2));
        assert_eq!(matcher.longest_match("a"), None);
    }

    #[test]
    fn empty_match() {
        let fa = compile("a*").unwrap();
        let matcher = Matcher::new(&fa);

        assert_eq!(matcher.longest_match(""), Some(0));
        assert_eq!(matcher.longest_match("b"), Some(0));
        assert_eq!(matcher.longest_match("aab"), Some(2));
        assert!(matcher.is_match(""));
    }

    #[test]
    fn error_state_as_initial() {
        let fa = Automaton::new();
        let matcher = Matcher::new(&fa);

        assert_eq!(matcher.longest_match(""), None);
        assert!(matcher.find_all("abc").is_empty());
    }

    #[test]
    fn find_all() {
        let fa = compile("[0-9]+|[a-z]+").unwrap();
        let matcher = Matcher::new(&fa);
        let input = "abc 123,x9";

        let found: Vec<&str> = matcher
            .find_all(input)
            .iter()
            .map(|m| m.as_str(input))
            .collect();

        assert_eq!(found, vec!["abc", "123", "x", "9"]);
        assert_eq!(
            matcher.find_all(input)[1],
            MatchResult { start: 4, end: 7 }
        );
    }

    #[test]
    fn find_all_skips_empty_matches() {
        let fa = compile("a*").unwrap();
        let matches = Matcher::new(&fa).find_all("baab");

        assert_eq!(matches, vec![MatchResult { start: 1, end: 3 }]);
        assert_eq!(matches[0].len(), 2);
    }

    #[test]
    fn non_ascii_input() {
        let fa = compile(".+").unwrap();
        let matcher = Matcher::new(&fa);

        assert_eq!(matcher.longest_match("ab\u{e9}"), Some(2));
        assert!(!matcher.is_match("\u{e9}"));
    }

    #[test]
    fn dfa_and_nfa_agree() {
        fn p(input: Vec<u8>) -> bool {
            let input: String =
                input.iter().map(|b| (b'a' + b % 3) as char).collect();
            let dfa = a_then_ab();
            let nfa = compile("a(a|b)*").unwrap();
            Matcher::new(&dfa).longest_match(&input)
                == Matcher::new(&nfa).longest_match(&input)
        }
        quickcheck(p as fn(Vec<u8>) -> bool);
    }
}
