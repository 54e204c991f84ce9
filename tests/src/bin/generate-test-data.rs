use chrono::{Duration, TimeZone, Utc};
use kurs_api::{ApiComment, ApiRate, ApiUser, CommentId, CommentPage, PostId, Time};
use rand::{seq::SliceRandom, Rng};

const NUM_USERS: usize = 5;
const NUM_TOP_LEVEL: usize = 20;
const MAX_REPLIES: usize = 4;
const MAX_DEPTH: usize = 3;
const COMMENT_WORD_COUNT: usize = 12;

const CURRENCIES: [&str; 6] = ["EUR", "GBP", "CHF", "JPY", "PLN", "RUB"];

struct Gen<R> {
    rng: R,
    users: Vec<ApiUser>,
    next_id: i64,
    clock: Time,
}

impl<R: Rng> Gen<R> {
    fn user(&mut self) -> ApiUser {
        self.users[self.rng.gen_range(0..self.users.len())].clone()
    }

    fn comment(&mut self, post: PostId, parent: Option<CommentId>, depth: usize) -> ApiComment {
        let id = CommentId(self.next_id);
        self.next_id += 1;
        self.clock = self.clock + Duration::minutes(self.rng.gen_range(1..120));
        let created_at = self.clock;
        let num_replies = match depth < MAX_DEPTH {
            true => self.rng.gen_range(0..=MAX_REPLIES) >> depth,
            false => 0,
        };
        let replies = (0..num_replies)
            .map(|_| self.comment(post, Some(id), depth + 1))
            .collect::<Vec<_>>();
        let like_count = self.rng.gen_range(0..50);
        ApiComment {
            id,
            post_id: post,
            parent_id: parent,
            user: self.user(),
            content: lipsum::lipsum_words(COMMENT_WORD_COUNT),
            created_at,
            like_count,
            reply_count: replies.len() as i64,
            is_liked: like_count > 0 && self.rng.gen_bool(0.3),
            replies,
        }
    }

    fn rate(&mut self, currency: &str) -> ApiRate {
        let sell = self.rng.gen_range(0.5..2.0);
        let spread = self.rng.gen_range(0.0..0.05);
        ApiRate {
            currency_code: currency.to_string(),
            buy_rate: (sell * (1. - spread) * 1e4_f64).round() / 1e4,
            sell_rate: (sell * 1e4_f64).round() / 1e4,
        }
    }
}

fn main() -> Result<(), serde_json::Error> {
    let mut rng = rand::thread_rng();
    let users = (0..NUM_USERS)
        .map(|_| {
            let name = lipsum::lipsum_title();
            ApiUser {
                username: name.to_lowercase().replace(|c: char| !c.is_alphanumeric(), ""),
                display_name: name,
                profile_picture_url: None,
            }
        })
        .collect();
    let mut gen = Gen {
        rng: &mut rng,
        users,
        next_id: 1,
        clock: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
    };

    let post = PostId(1);
    let mut results = (0..NUM_TOP_LEVEL)
        .map(|_| gen.comment(post, None, 0))
        .collect::<Vec<_>>();
    // the backend lists top-level comments newest first
    results.reverse();

    let mut currencies = CURRENCIES.to_vec();
    currencies.shuffle(&mut gen.rng);
    let num_rates = gen.rng.gen_range(2..=currencies.len());
    let rates = currencies[..num_rates]
        .iter()
        .map(|c| gen.rate(c))
        .collect::<Vec<_>>();

    let data = serde_json::json!({
        "comments": CommentPage { results, next: None },
        "rates": rates,
    });
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
