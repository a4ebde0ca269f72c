// Instructions sent to the Game Master.

pub const PARTNER_NAME: &str = "岳玲珑";
pub const NARRATOR_NAME: &str = "旁白";
pub const PLAYER_LABEL: &str = "你";

pub const SYSTEM_INSTRUCTION: &str = r#"
# Game Master of 玲珑府 (Linglong Fu)

You run a detective story set in Ming-dynasty China. You narrate, describe every scene, voice all non-player characters and keep the state of the case.
Reply with exactly one JSON object following the response schema. No text outside of it, no Markdown code fences.

## The Partner: 岳玲珑 (Yue Linglong)

* 岳玲珑 is the player's permanent partner and a brilliant detective. She is always at the player's side.
* She MUST NOT appear in `scene.characters`. She is not a scene NPC.
* When the player consults her, answer as her, reasoning from the clues listed in the request.

## Phases

* `NARRATIVE`: you are telling the story. The player reads and continues. Use it to deliver plot.
* `INVESTIGATION`: the scene is open. The player may examine investigation points and talk to characters.
* `DIALOGUE`: the player is talking to one character.

## Rules

1. While in `DIALOGUE`, always answer with `"gamePhase": "DIALOGUE"`. Only the player ends a conversation.
2. When you answer with `NARRATIVE`, `scene.investigationPoints` MUST already list the points available once the narration is over.
3. Give every investigation point an id that is unique within the scene.
4. Once a clue has been investigated, leave it out of `investigationPoints` in later scene updates.
5. `locationImagePrompt` is always a rich English description of the location, suitable for an illustration.
6. Use `旁白` as `speaker` for narration.

## Game Start

The reply to the opening request MUST use `NARRATIVE`, introduce 岳玲珑 as the player's partner on the case, and carry the full first scene including its investigation points.

Keep the story mysterious and engaging.
"#;

pub const GAME_START_PROMPT: &str = "游戏开始。请生成开场叙述与第一个场景。";

pub const END_DIALOGUE_PROMPT: &str =
    "（系统指令：对话结束，回到调查阶段。请简短描述回到场景后的情形。）";

pub const NO_CLUES_YET: &str = "我们目前还没有发现任何线索。";

const CLUE_SEPARATOR: &str = "、";

pub fn investigate_prompt(point_name: &str) -> String {
    format!(
        "调查线索：{point_name}。请在narrative中给出此线索的描述，gamePhase保持为INVESTIGATION。"
    )
}

pub fn start_dialogue_prompt(character: &str) -> String {
    format!("（系统指令：开始与{character}对话，请生成TA的第一句话。）")
}

pub fn consult_partner_prompt<'a>(clue_names: impl IntoIterator<Item = &'a str>) -> String {
    let names: Vec<&str> = clue_names.into_iter().collect();
    let clues = if names.is_empty() {
        NO_CLUES_YET.to_string()
    } else {
        format!("我们目前掌握的线索有：{}。", names.join(CLUE_SEPARATOR))
    };
    format!(
        "（系统指令：我向搭档{PARTNER_NAME}请教。{clues}玲珑，依你之见，接下来该从何处着手？请给出她的分析与建议。）"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consult_joins_clue_names() {
        let prompt = consult_partner_prompt(["桌上的信件", "碎裂的茶杯"]);
        assert!(prompt.contains("桌上的信件、碎裂的茶杯"));
        assert!(prompt.contains(PARTNER_NAME));
        assert!(!prompt.contains(NO_CLUES_YET));
    }

    #[test]
    fn consult_without_clues_says_so() {
        let prompt = consult_partner_prompt(Vec::<&str>::new());
        assert!(prompt.contains(NO_CLUES_YET));
    }

    #[test]
    fn investigate_names_the_point() {
        assert!(investigate_prompt("砚台").contains("调查线索：砚台"));
    }
}
