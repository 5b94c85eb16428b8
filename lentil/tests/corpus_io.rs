use lentil::{Corpus, LdaError, WordCount};
use matrix_util::common_io::{create_temp_dir_file, write_lines};

fn lines(xs: &[&str]) -> Vec<Box<str>> {
    xs.iter().map(|&x| Box::from(x)).collect()
}

#[test]
fn load_plain_and_gzip() -> anyhow::Result<()> {
    let content = lines(&[
        "7 0:2 4:1",
        "# not a number either",
        "3 1:1 2:3",
        "5",
        "",
        "1 2:1 bad 3:1:1",
    ]);

    for suffix in ["corpus.txt", "corpus.txt.gz"] {
        let file = create_temp_dir_file(suffix)?;
        let file = file.to_str().unwrap();
        write_lines(&content, file)?;

        // "# not a number either" has a non-numeric document id
        assert!(matches!(
            Corpus::load(file),
            Err(LdaError::Parse { line: 2, .. })
        ));
    }

    let content = lines(&["7 0:2 4:1", "3 1:1 2:3", "5", "", "1 2:1 bad 3:1:1"]);
    for suffix in ["corpus.txt", "corpus.txt.gz"] {
        let file = create_temp_dir_file(suffix)?;
        let file = file.to_str().unwrap();
        write_lines(&content, file)?;

        let corpus = Corpus::load(file)?;
        assert_eq!(corpus.doc_ids(), vec![1, 3, 7]);
        assert_eq!(corpus.vocab_size(), 5);
        assert_eq!(corpus.num_tokens(), 1 + 4 + 3);
        assert_eq!(corpus.document(0).tokens(), &[2]);
        assert_eq!(corpus.document(2).tokens(), &[0, 0, 4]);
    }
    Ok(())
}

#[test]
fn missing_file_is_io_error() {
    assert!(matches!(
        Corpus::load("/nonexistent/lentil/corpus.txt"),
        Err(LdaError::Io(_))
    ));
}

#[test]
fn write_then_load() -> anyhow::Result<()> {
    let mut corpus = Corpus::new();
    corpus.add_doc(
        10,
        vec![
            WordCount { word: 3, count: 2 },
            WordCount { word: 0, count: 1 },
        ],
    );
    corpus.add_doc(2, vec![WordCount { word: 1, count: 5 }]);

    let file = create_temp_dir_file("corpus.gz")?;
    let file = file.to_str().unwrap();
    corpus.write(file)?;

    let loaded = Corpus::load(file)?;
    assert_eq!(loaded.doc_ids(), corpus.doc_ids());
    assert_eq!(loaded.vocab_size(), corpus.vocab_size());
    for (a, b) in loaded.documents().iter().zip(corpus.documents()) {
        assert_eq!(a.tokens(), b.tokens());
    }
    Ok(())
}
