use std::collections::BTreeSet;
use std::io::Write;

use dawgplay::dawg::builder::{build_trie, compile_file, compile_words, WordListOptions};
use dawgplay::dawg::Lexicon;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn random_words(rng: &mut StdRng, alphabet: &[char], count: usize) -> BTreeSet<String> {
    (0..count)
        .map(|_| {
            let length = rng.gen_range(1..=7);
            (0..length)
                .map(|_| *alphabet.choose(rng).unwrap())
                .collect()
        })
        .collect()
}

#[test]
fn random_lists_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = StdRng::seed_from_u64(3);
    let alphabet = ['E', 'R', 'S', 'T', 'Å', 'Ö'];
    for _ in 0..40 {
        let words = random_words(&mut rng, &alphabet, 200);
        let encoded = compile_words(&words).unwrap();
        assert!(encoded.node_count() <= build_trie(&words).node_count());

        let lexicon = Lexicon::from_encoded(&encoded).unwrap();
        let decoded: Vec<String> = lexicon.words();
        let expected: Vec<String> = words.iter().cloned().collect();
        assert_eq!(decoded, expected);

        for word in &words {
            assert!(lexicon.has_word(word), "{word}");
            // Every infix of a word is a sequence.
            let letters: Vec<char> = word.chars().collect();
            for start in 0..letters.len() {
                let infix: String = letters[start..].iter().collect();
                assert!(lexicon.has_sequence(&infix), "{infix}");
            }
        }
    }
}

#[test]
fn insertion_order_does_not_matter() {
    let mut rng = StdRng::seed_from_u64(5);
    let words: Vec<String> = random_words(&mut rng, &['A', 'B', 'C'], 60)
        .into_iter()
        .collect();
    let sorted = compile_words(&words).unwrap();
    let mut shuffled = words.clone();
    shuffled.shuffle(&mut rng);
    assert_eq!(compile_words(&shuffled).unwrap(), sorted);
}

#[test]
fn records_are_well_formed() {
    let mut rng = StdRng::seed_from_u64(9);
    let words = random_words(&mut rng, &['A', 'B', 'C', 'D'], 150);
    let encoded = compile_words(&words).unwrap();
    let records: Vec<_> = encoded.records().collect();
    assert_eq!(records.len(), encoded.node_count());
    assert!(records.last().is_some_and(|r| r.is_end_of_list));
    for record in &records {
        assert!(usize::from(record.letter_index) < encoded.alphabet().len());
        if let Some(child) = record.child_index() {
            assert!(child < records.len());
        }
    }
}

#[test]
fn word_list_file_to_dictionary_file() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("words.txt");
    let mut file = std::fs::File::create(&list).unwrap();
    writeln!(file, "# animals").unwrap();
    for word in ["cat", "cats", "dog", "dogs", "x", "zebra"] {
        writeln!(file, "{word}").unwrap();
    }
    drop(file);

    let options = WordListOptions {
        max_length: Some(4),
        ..WordListOptions::default()
    };
    let encoded = compile_file(&list, &options).unwrap();
    let dict = dir.path().join("animals.dict");
    encoded.save(&dict).unwrap();

    let lexicon = Lexicon::open(&dict).unwrap();
    assert_eq!(lexicon.words(), ["CAT", "CATS", "DOG", "DOGS"]);
    assert!(!lexicon.has_word("ZEBRA"));
    assert!(!lexicon.has_word("X"));
    assert_eq!(lexicon.find_anagrams("STAC"), ["CAT", "CATS"]);
}
