/// Word list loading and the compile pipeline.
pub mod builder;
/// Packed dictionary records and index assignment.
pub mod encode;
/// The decoded, bidirectional word graph used by the move search.
pub mod lexicon;
/// Suffix sharing: trie to DAWG reduction.
pub mod reduce;
/// Construction-time prefix tree.
pub mod trie;

pub use builder::{build_lexicon, compile_file, compile_words, CompileError, IntoWord, WordListOptions};
pub use encode::EncodedDawg;
pub use lexicon::{DecodeError, LetterNode, Lexicon};
pub use reduce::Dawg;
pub use trie::Trie;

#[cfg(test)]
mod test {
    use super::*;

    /// Full pipeline on a list with shared prefixes and suffixes.
    #[test]
    fn all_words() {
        let words = [
            "ÅTMINSTONE", "BAKE", "BAKED", "BAKES", "CAKE", "CAKED", "CAKES", "FAKE", "FAKED",
            "LAKE", "MAKE", "MAKES", "URSINN",
        ];
        let encoded = compile_words(words).unwrap();
        let lexicon = Lexicon::from_encoded(&encoded).unwrap();
        for word in words {
            assert!(lexicon.has_word(word), "{}", word);
        }
        // test some non-words
        assert!(!lexicon.has_word("URSINNESS"));
        assert!(!lexicon.has_word("ÅTMINSTON"));
        assert!(!lexicon.has_word("LAKES"));
        assert!(!lexicon.has_word("AKE"));
        assert!(lexicon.has_sequence("AKE"));
    }

    #[test]
    fn add_word() {
        let lexicon = build_lexicon(["TEST", "TESTER", "WTEST"]).unwrap();

        let n = lexicon.root('T').unwrap();
        assert!(!lexicon.node(n).is_end_of_word());

        let n = lexicon.node(n).child('E').unwrap();
        assert!(!lexicon.node(n).is_end_of_word());

        let n = lexicon.node(n).child('S').unwrap();
        assert!(!lexicon.node(n).is_end_of_word());

        let n = lexicon.node(n).child('T').unwrap();
        assert!(lexicon.node(n).is_end_of_word());

        let n = lexicon.node(n).child('E').unwrap();
        assert!(!lexicon.node(n).is_end_of_word());

        let n = lexicon.node(n).child('R').unwrap();
        assert!(lexicon.node(n).is_end_of_word());

        assert_eq!(lexicon.node(n).child('T'), None);
    }
}
