use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static QUESTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"- Question \d+: (.+)").unwrap());

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse answers in {path:?}: {source}")]
    Answers {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Fixed question set the batch query tool runs against the Solana corpus.
pub fn solana_question_set() -> Vec<String> {
    [
        "What is the main function of Solana's proof-of-history mechanism?",
        "What is the consensus mechanism used by Solana, and how does it differ from Ethereum's?",
        "What was Solana's price jump during August 2021?",
        "What is the main purpose of NX finance in Solana ecosystem?",
        "What does the Vault's stake pool in Solana focus on?",
        "How does Solana attempt to solve the blockchain trilemma (scalability, security, decentralization)?",
        "What are some of the key advantages of using Solana over other blockchains like Ethereum and Cardano?",
        "How does Solana maintain decentralization while scaling to high transaction speeds?",
        "What is the significance of the Solana Mobile Stack for the network's future?",
        "What is Solana's approach to improving user experience in blockchain applications?",
        "Why is Solana considered an 'Ethereum killer'?",
        "Based on the Solana network's consensus mechanisms, how might it impact energy consumption compared to Bitcoin or Ethereum's earlier models?",
        "Why might Solana be more attractive for NFT platforms compared to Ethereum?",
        "What potential challenges could Solana face in maintaining decentralization as its network scales?",
        "How does Solana compare to Ethereum in terms of dApp availability and growth?",
        "What is the main difference between Solana's proof-of-history and Bitcoin's proof-of-work?",
        "How do the transaction fees on Solana compare to those on Ethereum?",
        "What differentiates Solana's approach to consensus from traditional proof-of-stake?",
        "When was Solana launched?",
        "What is Solana's token called?",
        "What was the peak value of Solana's token (SOL) in November 2021?",
        "When did Anatoly Yakovenko propose Solana's blockchain?",
        "What is the average transaction throughput (TPS) of Solana according to recent data analysis?",
        "What major vulnerability resulted in the loss of 325 million USD in the Solana ecosystem?",
        "What percentage of Solana's smart contracts are developed using the Anchor framework?",
        "Explain how delegated proof-of-stake works in Solana.",
        "What role do validators play in Solana's blockchain?",
        "What is a validator node in Solana, and what does it do?",
        "How does Solana handle high throughput and scalability in its blockchain?",
        "What is the role of smart contracts in Solana?",
        "What is proof-of-history?",
        "What are the primary components of Solana's network architecture? ",
        "What are Program Derived Addresses (PDAs) in Solana?",
        "What is the significance of Cross-Program Invocations (CPIs) in Solana development?",
        "How can Solana be used in decentralized finance (DeFi)?",
        "What use cases does Solana offer for NFTs?",
        "How does Solana support decentralized finance (DeFi) innovation through platforms like NX Finance?",
        "How can developers leverage Solana for creating high-performance applications?",
        "How does Solana's unique combination of proof-of-history and delegated proof-of-stake contribute to its scalability, and why is this combination considered superior to traditional proof-of-work systems?",
        "What impact did Solana's proof-of-history mechanism have on its ability to address the blockchain trilemma (scalability, security, decentralization), and how does this compare to Ethereum's approach?",
        "Considering Solana's low transaction fees and high throughput, what advantages does it offer for decentralized finance (DeFi) and NFT platforms, and how do these features contrast with Ethereum's higher fees?",
        "How do Solana's transaction confirmation speeds (400ms) benefit decentralized applications (dApps) in the finance and gaming sectors, and what challenges might arise as the network scales?",
        "How does the role of validators in Solana's delegated proof-of-stake system ensure security, and what role does the Vault's community-driven validator selection play in decentralization?",
        "In what ways do Solana's smart contract capabilities (similar to Ethereum) support both decentralized finance (DeFi) and non-fungible tokens (NFTs), and how does Solana's performance in these areas differ from Ethereum's?",
        "How does Solana's approach to validator selection and rewards through NX Finance's leveraging strategies benefit users with varying risk profiles, and what risks might this pose to the network's overall security?",
        "Considering Solana's success in launching the Degenerate Ape Academy and its NFT platform, how might its ecosystem continue to evolve with the introduction of the Solana Mobile Stack, and what implications does this have for user adoption?",
        "How does Solana's approach to consensus mechanisms, particularly the combination of PoH and Proof of Stake (PoS), address the blockchain trilemma of scalability, security, and decentralization?",
        "How does Solana's transaction throughput, as recorded in recent studies, compare to traditional blockchains like Ethereum, and what specific design elements allow Solana to achieve such performance?",
        "Given that Rust is one of the programming languages used to develop Solana smart contracts, how do its features contribute to both the security and challenges faced by developers?",
        "In what ways does Solana address the scalability challenges faced by earlier blockchains like Bitcoin and Ethereum, and what mechanisms ensure that security and decentralization are maintained?",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Questions listed as `- Question <n>: <text>` lines, in file order.
pub fn parse_question_file(text: &str) -> Vec<String> {
    QUESTION_LINE
        .captures_iter(text)
        .map(|captures| captures[1].to_string())
        .collect()
}

pub fn read_question_file(path: &Path) -> Result<Vec<String>, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_question_file(&text))
}

#[derive(Deserialize)]
struct AnswerRecord {
    result: String,
}

/// Answers from a JSON array of `{"result": "..."}` records, in array order.
pub fn load_answers(path: &Path) -> Result<Vec<String>, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records: Vec<AnswerRecord> =
        serde_json::from_str(&text).map_err(|source| InputError::Answers {
            path: path.display().to_string(),
            source,
        })?;
    Ok(records.into_iter().map(|r| r.result).collect())
}
