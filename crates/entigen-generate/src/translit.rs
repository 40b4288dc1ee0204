//! Kana-to-Latin transliteration for email and address rendering.
//!
//! Covers hiragana and katakana syllables, digraphs (small ya/yu/yo and
//! small vowels), the sokuon (doubled consonant) and the long vowel mark.
//! Characters outside the kana blocks pass through unchanged.

/// Transliterate kana in `input` to lowercase Latin.
pub fn to_latin(input: &str) -> String {
    let chars: Vec<char> = input.chars().map(hiragana_to_katakana).collect();
    let mut out = String::with_capacity(input.len());
    let mut sokuon = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == 'ッ' {
            sokuon = true;
            i += 1;
            continue;
        }
        if ch == 'ー' {
            // Long vowel mark repeats the previous vowel.
            if let Some(vowel) = out.chars().last().filter(|c| "aeiou".contains(*c)) {
                out.push(vowel);
            }
            i += 1;
            continue;
        }

        let Some(base) = syllable(ch) else {
            sokuon = false;
            out.push(ch);
            i += 1;
            continue;
        };

        let combined = match chars.get(i + 1).copied().and_then(small_kana) {
            Some(small) => {
                i += 1;
                // Digraph: drop the base vowel, append the small kana sound.
                let stem = base.trim_end_matches(|c| "aeiou".contains(c));
                format!("{stem}{small}")
            }
            None => base.to_string(),
        };

        if sokuon {
            if let Some(first) = combined
                .chars()
                .next()
                .filter(|c| c.is_ascii_alphabetic() && !"aeiou".contains(*c))
            {
                out.push(first);
            }
            sokuon = false;
        }

        out.push_str(&combined);
        i += 1;
    }

    out
}

fn hiragana_to_katakana(ch: char) -> char {
    if ('ぁ'..='ゖ').contains(&ch) {
        char::from_u32(ch as u32 + 0x60).unwrap_or(ch)
    } else {
        ch
    }
}

fn small_kana(ch: char) -> Option<&'static str> {
    Some(match ch {
        'ャ' => "ya",
        'ュ' => "yu",
        'ョ' => "yo",
        'ァ' => "a",
        'ィ' => "i",
        'ゥ' => "u",
        'ェ' => "e",
        'ォ' => "o",
        _ => return None,
    })
}

fn syllable(ch: char) -> Option<&'static str> {
    Some(match ch {
        'ア' => "a",
        'イ' => "i",
        'ウ' => "u",
        'エ' => "e",
        'オ' => "o",
        'カ' => "ka",
        'キ' => "ki",
        'ク' => "ku",
        'ケ' => "ke",
        'コ' => "ko",
        'ガ' => "ga",
        'ギ' => "gi",
        'グ' => "gu",
        'ゲ' => "ge",
        'ゴ' => "go",
        'サ' => "sa",
        'シ' => "shi",
        'ス' => "su",
        'セ' => "se",
        'ソ' => "so",
        'ザ' => "za",
        'ジ' => "ji",
        'ズ' => "zu",
        'ゼ' => "ze",
        'ゾ' => "zo",
        'タ' => "ta",
        'チ' => "chi",
        'ツ' => "tsu",
        'テ' => "te",
        'ト' => "to",
        'ダ' => "da",
        'ヂ' => "ji",
        'ヅ' => "zu",
        'デ' => "de",
        'ド' => "do",
        'ナ' => "na",
        'ニ' => "ni",
        'ヌ' => "nu",
        'ネ' => "ne",
        'ノ' => "no",
        'ハ' => "ha",
        'ヒ' => "hi",
        'フ' => "fu",
        'ヘ' => "he",
        'ホ' => "ho",
        'バ' => "ba",
        'ビ' => "bi",
        'ブ' => "bu",
        'ベ' => "be",
        'ボ' => "bo",
        'パ' => "pa",
        'ピ' => "pi",
        'プ' => "pu",
        'ペ' => "pe",
        'ポ' => "po",
        'マ' => "ma",
        'ミ' => "mi",
        'ム' => "mu",
        'メ' => "me",
        'モ' => "mo",
        'ヤ' => "ya",
        'ユ' => "yu",
        'ヨ' => "yo",
        'ラ' => "ra",
        'リ' => "ri",
        'ル' => "ru",
        'レ' => "re",
        'ロ' => "ro",
        'ワ' => "wa",
        'ヲ' => "wo",
        'ン' => "n",
        'ヴ' => "vu",
        _ => return None,
    })
}
