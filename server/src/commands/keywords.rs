use clap::Subcommand;
use color_eyre::Result;
use db::validation::KeywordCache;
use uuid::Uuid;

#[derive(Subcommand)]
pub(crate) enum KeywordAction {
    /// Ban a single word
    Add { word: String },
    /// Print every banned word
    List,
    /// Lift a ban by keyword id
    Remove { id: Uuid },
}

impl KeywordAction {
    pub(crate) async fn run(&self) -> Result<()> {
        let keywords = KeywordCache::load(super::connect().await?).await?;

        match self {
            KeywordAction::Add { word } => {
                let keyword = keywords.add(word).await?;
                println!("{}\t{}", keyword.keyword_id, keyword.word);
            }
            KeywordAction::List => {
                for keyword in keywords.list().await? {
                    println!("{}\t{}", keyword.keyword_id, keyword.word);
                }
            }
            KeywordAction::Remove { id } => {
                keywords.remove(*id).await?;
                println!("Removed {id}");
            }
        }

        Ok(())
    }
}
