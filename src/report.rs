//! Read-side queries for the export collaborator: which members withdrew on
//! a given date, paired with their current roster records, plus the payment
//! note the out-of-scope QR layer encodes verbatim.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fund::Fund;
use crate::member::Member;
use crate::round::Round;

/// A withdrawal paired with the receiver's current member record. The round
/// carries the historical name snapshot; `member` reflects any profile edits
/// made since.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalNotice {
    pub round: Round,
    pub member: Member,
}

/// Rounds across all of the fund's tables whose timestamp falls on `date`,
/// de-duplicated by receiver and sorted by member name.
pub fn withdrawals_on(fund: &Fund, date: NaiveDate) -> Vec<WithdrawalNotice> {
    let mut seen = HashSet::new();
    let mut notices = Vec::new();
    for table in fund.tables() {
        for round in table.rounds() {
            if round.drawn_at.date_naive() != date {
                continue;
            }
            if !seen.insert(round.receiver_id) {
                continue;
            }
            if let Some(member) = table.roster().get(round.receiver_id) {
                notices.push(WithdrawalNotice {
                    round: round.clone(),
                    member: member.clone(),
                });
            }
        }
    }
    notices.sort_by(|a, b| a.member.name.cmp(&b.member.name));
    notices
}

/// The transfer reference line for paying a member, or `None` when no
/// account number is on file. The holder name is folded to unaccented ASCII
/// so downstream QR encoders stay within their character set.
pub fn transfer_note(member: &Member) -> Option<String> {
    let account = member.payout_account.as_ref()?;
    if account.account_number.is_empty() {
        return None;
    }
    let bank = if account.bank_name.is_empty() {
        "unknown"
    } else {
        account.bank_name.as_str()
    };
    Some(format!(
        "acct:{}, bank:{}, holder:{}",
        account.account_number,
        bank,
        fold_accents(&member.name)
    ))
}

/// Folds Vietnamese diacritics to their base ASCII letters and lowercases
/// the result.
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(fold_char)
        .collect::<String>()
        .to_lowercase()
}

fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'ạ' | 'ả' | 'ã' | 'â' | 'ầ' | 'ấ' | 'ậ' | 'ẩ' | 'ẫ' | 'ă' | 'ằ' | 'ắ'
        | 'ặ' | 'ẳ' | 'ẵ' => 'a',
        'è' | 'é' | 'ẹ' | 'ẻ' | 'ẽ' | 'ê' | 'ề' | 'ế' | 'ệ' | 'ể' | 'ễ' => 'e',
        'ì' | 'í' | 'ị' | 'ỉ' | 'ĩ' => 'i',
        'ò' | 'ó' | 'ọ' | 'ỏ' | 'õ' | 'ô' | 'ồ' | 'ố' | 'ộ' | 'ổ' | 'ỗ' | 'ơ' | 'ờ' | 'ớ'
        | 'ợ' | 'ở' | 'ỡ' => 'o',
        'ù' | 'ú' | 'ụ' | 'ủ' | 'ũ' | 'ư' | 'ừ' | 'ứ' | 'ự' | 'ử' | 'ữ' => 'u',
        'ỳ' | 'ý' | 'ỵ' | 'ỷ' | 'ỹ' => 'y',
        'đ' => 'd',
        'À' | 'Á' | 'Ạ' | 'Ả' | 'Ã' | 'Â' | 'Ầ' | 'Ấ' | 'Ậ' | 'Ẩ' | 'Ẫ' | 'Ă' | 'Ằ' | 'Ắ'
        | 'Ặ' | 'Ẳ' | 'Ẵ' => 'A',
        'È' | 'É' | 'Ẹ' | 'Ẻ' | 'Ẽ' | 'Ê' | 'Ề' | 'Ế' | 'Ệ' | 'Ể' | 'Ễ' => 'E',
        'Ì' | 'Í' | 'Ị' | 'Ỉ' | 'Ĩ' => 'I',
        'Ò' | 'Ó' | 'Ọ' | 'Ỏ' | 'Õ' | 'Ô' | 'Ồ' | 'Ố' | 'Ộ' | 'Ổ' | 'Ỗ' | 'Ơ' | 'Ờ' | 'Ớ'
        | 'Ợ' | 'Ở' | 'Ỡ' => 'O',
        'Ù' | 'Ú' | 'Ụ' | 'Ủ' | 'Ũ' | 'Ư' | 'Ừ' | 'Ứ' | 'Ự' | 'Ử' | 'Ữ' => 'U',
        'Ỳ' | 'Ý' | 'Ỵ' | 'Ỷ' | 'Ỹ' => 'Y',
        'Đ' => 'D',
        other => other,
    }
}
