use regex::Regex;

use crate::db::SubmissionKind;

/// System instruction for the review model: a five-section markdown review in
/// Japanese, ending with a parseable overall-score line.
pub const SYSTEM_PROMPT: &str = r#"あなたはWeb技術講座のAI講師アシスタントです。受講生が提出した課題をレビューし、学習を促進するフィードバックを提供してください。

以下の5つのセクションでMarkdown形式のレビューを生成してください：

## 1. 要件達成度
課題の各要件について、以下のいずれかで判定してください：
- **達成**: 要件を満たしている
- **部分的**: 一部満たしているが改善の余地がある
- **未達成**: 要件を満たしていない

## 2. コード品質・可読性
コードの構造、命名規則、フォーマット、ベストプラクティスの観点から評価してください。

## 3. 改善提案（最大3つ）
具体的なコード例を含めた改善提案を最大3つ提示してください。

## 4. 学習アドバイス
この課題を通じて学ぶべきポイントや、次のステップとして取り組むべきことを提案してください。

## 5. 総合スコア
100点満点で総合スコアを提示してください。フォーマット: **総合スコア: XX/100**

---
フィードバックは建設的で励ましを含むものにしてください。初学者にもわかりやすい日本語で記述してください。"#;

/// Build the user turn for a review request.
///
/// Code is embedded in a fenced block and truncated to `max_code_chars`
/// characters with an explicit omitted-character note, so the model knows its
/// view is partial. URLs are passed verbatim with a note that the model
/// cannot browse them and should judge well-formedness and plausibility only.
pub fn build_user_prompt(
    exercise_instructions: &str,
    submission_content: &str,
    kind: SubmissionKind,
    max_code_chars: usize,
) -> String {
    match kind {
        SubmissionKind::Url => format!(
            "## 課題内容\n{exercise_instructions}\n\n## 提出内容（URL）\n{submission_content}\n\n\
             ※ URL提出のため、URLの内容を直接確認することはできません。URL形式の妥当性と、\
             課題要件への適合性（URLの構造やドメインから推測できる範囲）のみ評価してください。"
        ),
        SubmissionKind::Code => {
            let (head, omitted) = truncate_chars(submission_content, max_code_chars);
            let code = if omitted > 0 {
                format!("{head}\n\n... ({omitted}文字省略)")
            } else {
                head.to_string()
            };

            format!("## 課題内容\n{exercise_instructions}\n\n## 提出コード\n```\n{code}\n```")
        }
    }
}

/// Extract the overall score from model output by searching for the fixed
/// `総合スコア: NN/100` marker. Returns `None` when the marker is absent; the
/// value is not clamped to 0–100.
pub fn parse_overall_score(review_content: &str) -> Option<i32> {
    let marker = Regex::new(r"総合スコア:\s*(\d+)\s*/\s*100").unwrap();
    marker
        .captures(review_content)
        .and_then(|caps| caps[1].parse().ok())
}

/// Split off the first `max` characters of `s`, returning the head and the
/// number of characters dropped. Splits on a char boundary.
fn truncate_chars(s: &str, max: usize) -> (&str, usize) {
    let total = s.chars().count();
    if total <= max {
        return (s, 0);
    }

    let end = s
        .char_indices()
        .nth(max)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    (&s[..end], total - max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_score_from_marker() {
        let review = "## 5. 総合スコア\n**総合スコア: 87/100**\n良い提出です。";
        assert_eq!(parse_overall_score(review), Some(87));
    }

    #[test]
    fn missing_marker_yields_none() {
        assert_eq!(parse_overall_score("スコアの記載がないレビュー"), None);
    }

    #[test]
    fn score_is_not_clamped() {
        assert_eq!(parse_overall_score("総合スコア: 103/100"), Some(103));
        assert_eq!(parse_overall_score("総合スコア: 0/100"), Some(0));
    }

    #[test]
    fn tolerates_spacing_around_slash() {
        assert_eq!(parse_overall_score("総合スコア:  72 / 100"), Some(72));
    }

    #[test]
    fn code_prompt_embeds_code_unmodified_when_within_limit() {
        let prompt = build_user_prompt("要件", "print('x')", SubmissionKind::Code, 50_000);
        assert!(prompt.contains("```\nprint('x')\n```"));
        assert!(!prompt.contains("文字省略"));
    }

    #[test]
    fn oversize_code_is_truncated_with_omitted_count() {
        let code = "a".repeat(15);
        let prompt = build_user_prompt("要件", &code, SubmissionKind::Code, 10);
        assert!(prompt.contains(&"a".repeat(10)));
        assert!(!prompt.contains(&"a".repeat(11)));
        assert!(prompt.contains("(5文字省略)"));
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let code = "あいうえお";
        let (head, omitted) = truncate_chars(code, 3);
        assert_eq!(head, "あいう");
        assert_eq!(omitted, 2);
    }

    #[test]
    fn url_prompt_passes_url_verbatim() {
        let prompt = build_user_prompt("要件", "not a url", SubmissionKind::Url, 50_000);
        assert!(prompt.contains("## 提出内容（URL）\nnot a url"));
        assert!(prompt.contains("直接確認することはできません"));
    }
}
