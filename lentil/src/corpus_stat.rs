use clap::Parser;
use lentil::Corpus;

#[derive(Parser, Debug, Clone)]
pub struct CorpusStatArgs {
    #[arg(long, required = true, help = "Corpus file (`.gz` allowed)")]
    corpus: Box<str>,
}

pub fn corpus_stat(args: &CorpusStatArgs) -> anyhow::Result<()> {
    let corpus = Corpus::load(&args.corpus)?;

    let ndocs = corpus.num_docs();
    let ntokens = corpus.num_tokens();
    let mean_len = if ndocs > 0 {
        ntokens as f64 / ndocs as f64
    } else {
        0.0
    };

    println!("documents\t{}", ndocs);
    println!("vocabulary\t{}", corpus.vocab_size());
    println!("tokens\t{}", ntokens);
    println!("mean_length\t{:.2}", mean_len);
    Ok(())
}
