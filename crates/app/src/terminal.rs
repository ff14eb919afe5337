//! Line-based front-end for a single game.
//!
//! Reads answers from stdin while the runner's events are printed as they
//! arrive, so countdown ticks and the pause after an answer play out in real
//! time.

use explorers_core::model::{
    Answer, ComparisonRound, CompositionRound, GameKind, OrderDirection, OrderingRound, Relation,
    Round, Side,
};
use explorers_core::session::{AnswerOutcome, IgnoredAnswer, SessionSnapshot};
use services::{AppServices, GameEvent, GameOverReport};
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line of player input, interpreted against the round on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Answer(Answer),
    Reset,
    Quit,
    Unrecognized,
}

pub(crate) async fn play(services: &AppServices, game: GameKind) -> std::io::Result<()> {
    let progress = services.progress().current().await;
    println!("{}", progress.greeting());
    println!(
        "{}  (best {})  type 'reset' to start over, 'quit' to leave",
        game.title(),
        progress.best_score(game)
    );

    let (runner, mut events) = services.start_game(game);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                render_event(&event);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    runner.exit();
                    break;
                };
                let snapshot = runner.snapshot();
                match parse_input(&line, snapshot.round.as_ref()) {
                    Input::Quit => {
                        runner.exit();
                        break;
                    }
                    Input::Reset => runner.reset(),
                    Input::Answer(answer) => {
                        if let AnswerOutcome::Ignored(reason) = runner.answer(&answer).await {
                            explain_ignored(&reason);
                        }
                    }
                    Input::Unrecognized => println!("{}", input_hint(snapshot.round.as_ref())),
                }
            }
        }
    }

    Ok(())
}

fn parse_input(line: &str, round: Option<&Round>) -> Input {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "quit" | "exit" | "q" => return Input::Quit,
        "reset" | "again" => return Input::Reset,
        _ => {}
    }

    let answer = match round {
        Some(Round::Comparison(_)) => match line.as_str() {
            "l" | "left" => Some(Answer::Side(Side::Left)),
            "r" | "right" => Some(Answer::Side(Side::Right)),
            _ => None,
        },
        Some(Round::Composition(_)) => line
            .parse::<usize>()
            .ok()
            .and_then(|choice| choice.checked_sub(1))
            .map(Answer::Choice),
        Some(Round::Ordering(_)) => line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse::<u32>)
            .collect::<Result<Vec<_>, _>>()
            .ok()
            .filter(|order| !order.is_empty())
            .map(Answer::Order),
        None => None,
    };

    answer.map_or(Input::Unrecognized, Input::Answer)
}

fn input_hint(round: Option<&Round>) -> &'static str {
    match round {
        Some(Round::Comparison(_)) => "answer with 'l' or 'r'",
        Some(Round::Composition(_)) => "answer with the option number",
        Some(Round::Ordering(_)) => "answer with every number, separated by spaces",
        None => "wait for the next round, or type 'reset' or 'quit'",
    }
}

fn explain_ignored(reason: &IgnoredAnswer) {
    match reason {
        IgnoredAnswer::NotPlaying => println!("hold on, no question yet"),
        IgnoredAnswer::Malformed(err) => println!("{err}"),
    }
}

fn render_event(event: &GameEvent) {
    match event {
        GameEvent::Countdown { remaining } => println!("{remaining}..."),
        GameEvent::RoundStarted(snapshot) => render_round(snapshot),
        GameEvent::AnswerJudged {
            correct,
            sound,
            snapshot,
        } => {
            let bell = if *sound { "\x07" } else { "" };
            let verdict = if *correct { "Correct!" } else { "Not quite." };
            println!(
                "{bell}{verdict}  score {}  mistakes {}/{}",
                snapshot.score, snapshot.wrong_count, snapshot.wrong_limit
            );
        }
        GameEvent::GameOver(report) => render_game_over(report),
    }
}

fn render_round(snapshot: &SessionSnapshot) {
    let info = snapshot.level.info(snapshot.game);
    println!();
    println!(
        "Level {}: {}  (question {})",
        snapshot.level,
        info.title,
        snapshot.questions_answered + 1
    );
    match &snapshot.round {
        Some(Round::Comparison(round)) => println!("{}", describe_comparison(round)),
        Some(Round::Composition(round)) => println!("{}", describe_composition(round)),
        Some(Round::Ordering(round)) => println!("{}", describe_ordering(round)),
        None => {}
    }
}

fn describe_comparison(round: &ComparisonRound) -> String {
    let word = match round.relation {
        Relation::Greater => "greater",
        Relation::Less => "smaller",
    };
    format!("Which number is {word}?  [l] {}   [r] {}", round.left, round.right)
}

fn describe_composition(round: &CompositionRound) -> String {
    let options = round
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| format!("[{}] {} + {}", index + 1, option.first, option.second))
        .collect::<Vec<_>>()
        .join("   ");
    format!("Which pair makes {}?  {options}", round.target)
}

fn describe_ordering(round: &OrderingRound) -> String {
    let direction = match round.direction {
        OrderDirection::Ascending => "smallest to largest",
        OrderDirection::Descending => "largest to smallest",
    };
    let numbers = round
        .numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    format!("Put these in order, {direction}:  {numbers}")
}

fn render_game_over(report: &GameOverReport) {
    println!();
    println!("Game over! Final score: {}", report.final_score);
    if report.is_new_best {
        println!("New best score for {}!", report.game.title());
    } else {
        println!("Best score: {}", report.best_score);
    }
    println!("type 'again' to play another round or 'quit' to leave");
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorers_core::model::CompositionOption;

    fn comparison() -> Round {
        Round::Comparison(ComparisonRound {
            left: 4,
            right: 7,
            relation: Relation::Greater,
        })
    }

    fn composition() -> Round {
        Round::Composition(CompositionRound {
            target: 8,
            options: vec![
                CompositionOption {
                    first: 3,
                    second: 5,
                    is_correct: true,
                },
                CompositionOption {
                    first: 2,
                    second: 9,
                    is_correct: false,
                },
            ],
        })
    }

    #[test]
    fn commands_work_without_a_round() {
        assert_eq!(parse_input(" QUIT ", None), Input::Quit);
        assert_eq!(parse_input("again", None), Input::Reset);
        assert_eq!(parse_input("l", None), Input::Unrecognized);
    }

    #[test]
    fn answers_follow_the_round_kind() {
        assert_eq!(
            parse_input("R", Some(&comparison())),
            Input::Answer(Answer::Side(Side::Right))
        );
        assert_eq!(
            parse_input("2", Some(&composition())),
            Input::Answer(Answer::Choice(1))
        );
        assert_eq!(parse_input("0", Some(&composition())), Input::Unrecognized);

        let ordering = Round::Ordering(OrderingRound {
            numbers: vec![5, 2, 9],
            direction: OrderDirection::Ascending,
        });
        assert_eq!(
            parse_input("2, 5 9", Some(&ordering)),
            Input::Answer(Answer::Order(vec![2, 5, 9]))
        );
        assert_eq!(parse_input("2 five 9", Some(&ordering)), Input::Unrecognized);
    }

    #[test]
    fn rounds_describe_their_question() {
        let Round::Comparison(round) = comparison() else {
            unreachable!()
        };
        assert_eq!(
            describe_comparison(&round),
            "Which number is greater?  [l] 4   [r] 7"
        );

        let Round::Composition(round) = composition() else {
            unreachable!()
        };
        assert_eq!(
            describe_composition(&round),
            "Which pair makes 8?  [1] 3 + 5   [2] 2 + 9"
        );
    }
}
