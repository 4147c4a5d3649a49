use blog_client::{BlogClientHttp, NewPost, Post, PostUpdate, SortDirection};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[clap(about = "Command line client for the Masterblog API")]
struct Cli {
    #[clap(short, long, env = "BLOG_SERVER", default_value = "http://127.0.0.1:5002")]
    server: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for SortDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => SortDirection::Asc,
            Direction::Desc => SortDirection::Desc,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all posts
    List {
        #[clap(long)]
        sort: Option<String>,
        #[clap(long, value_enum)]
        direction: Option<Direction>,
    },
    /// Show a single post
    Get { id: i64 },
    Create {
        #[clap(long)]
        title: String,
        #[clap(long)]
        content: String,
        #[clap(long)]
        author: String,
        /// Publication date, YYYY-MM-DD; defaults to today on the server
        #[clap(long)]
        created: Option<NaiveDate>,
    },
    Update {
        id: i64,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        content: Option<String>,
        #[clap(long)]
        author: Option<String>,
        #[clap(long)]
        created: Option<NaiveDate>,
    },
    Delete { id: i64 },
    /// Case-insensitive substring search; all given filters must match
    Search {
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        content: Option<String>,
        #[clap(long)]
        author: Option<String>,
    },
}

fn print_post(post: &Post) {
    println!("{}", post);
    println!("  created: {}", post.created);
    if let Some(updated) = post.updated {
        println!("  updated: {}", updated);
    }
    println!("  {}", post.content);
}

fn print_posts(posts: &[Post]) {
    println!("Posts ({})", posts.len());
    for post in posts {
        println!("- [{}] {} (by {}, {})", post.id, post.title, post.author, post.created);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let client = BlogClientHttp::connect(&args.server)?;

    match args.command {
        Command::List { sort, direction } => {
            let posts = client
                .list_posts(sort.as_deref(), direction.map(SortDirection::from))
                .await?;
            print_posts(&posts);
        }
        Command::Get { id } => {
            let post = client.get_post(id).await?;
            print_post(&post);
        }
        Command::Create {
            title,
            content,
            author,
            created,
        } => {
            let post = client
                .create_post(&NewPost {
                    title,
                    content,
                    author,
                    created,
                })
                .await?;
            println!("Post created! ID: {}", post.id);
        }
        Command::Update {
            id,
            title,
            content,
            author,
            created,
        } => {
            let update = PostUpdate {
                title,
                content,
                author,
                created,
            };
            let post = client.update_post(id, &update).await?;
            println!("Post updated: {}", post);
        }
        Command::Delete { id } => {
            let message = client.delete_post(id).await?;
            println!("{}", message);
        }
        Command::Search {
            title,
            content,
            author,
        } => {
            let filters: Vec<(&str, &str)> = [
                ("title", title.as_deref()),
                ("content", content.as_deref()),
                ("author", author.as_deref()),
            ]
            .into_iter()
            .filter_map(|(field, value)| value.map(|value| (field, value)))
            .collect();
            let posts = client.search_posts(&filters).await?;
            print_posts(&posts);
        }
    }

    Ok(())
}
