//! Message catalog for user-facing error text.
//!
//! Errors carry catalog keys (`error.*`, `validation.*`). Keys missing from
//! the catalog are treated as literal text and returned unchanged, which is
//! how messages relayed from the BaaS reach the client.

use std::borrow::Cow;

use domain::Locale;

fn entry(key: &str) -> Option<[&'static str; 3]> {
    // [ko, en, ja]
    let texts = match key {
        // Errors
        "error.unauthorized" => [
            "로그인이 필요합니다.",
            "Authentication required.",
            "ログインが必要です。",
        ],
        "error.session_expired" => [
            "세션이 만료되었습니다. 다시 로그인해 주세요.",
            "Your session has expired. Please sign in again.",
            "セッションの有効期限が切れました。再度ログインしてください。",
        ],
        "error.invalid_token" => [
            "유효하지 않은 인증 토큰입니다.",
            "Invalid or expired token.",
            "無効な認証トークンです。",
        ],
        "error.forbidden" => [
            "이 작업을 수행할 권한이 없습니다.",
            "You do not have permission to perform this action.",
            "この操作を行う権限がありません。",
        ],
        "error.invalid_credentials" => [
            "이메일 또는 비밀번호가 올바르지 않습니다.",
            "Invalid email or password.",
            "メールアドレスまたはパスワードが正しくありません。",
        ],
        "error.not_found" => [
            "요청한 리소스를 찾을 수 없습니다.",
            "The requested resource was not found.",
            "リソースが見つかりません。",
        ],
        "error.conflict" => [
            "이미 존재하는 항목입니다.",
            "The resource already exists.",
            "既に存在します。",
        ],
        "error.too_many_requests" => [
            "요청이 너무 많습니다. 잠시 후 다시 시도해 주세요.",
            "Too many requests. Please try again later.",
            "リクエストが多すぎます。しばらくしてから再度お試しください。",
        ],
        "error.service_unavailable" => [
            "서비스를 일시적으로 사용할 수 없습니다.",
            "The service is temporarily unavailable.",
            "サービスが一時的に利用できません。",
        ],
        "error.cache" => [
            "캐시 오류가 발생했습니다.",
            "A cache error occurred.",
            "キャッシュエラーが発生しました。",
        ],
        "error.internal" => [
            "서버 오류가 발생했습니다.",
            "An internal error occurred.",
            "サーバーエラーが発生しました。",
        ],
        "error.upstream" => [
            "외부 서비스 요청에 실패했습니다.",
            "The request to the backend service failed.",
            "バックエンドサービスへのリクエストに失敗しました。",
        ],
        "error.validation" => [
            "입력값이 올바르지 않습니다.",
            "Validation failed.",
            "入力内容が正しくありません。",
        ],
        "error.invitation_expired" => [
            "초대가 만료되었습니다.",
            "This invitation has expired.",
            "招待の有効期限が切れています。",
        ],
        "error.invitation_not_pending" => [
            "이미 처리된 초대입니다.",
            "This invitation is no longer pending.",
            "この招待は既に処理されています。",
        ],
        "error.self_modification" => [
            "자신의 권한은 변경할 수 없습니다.",
            "You cannot change your own membership.",
            "自分自身の権限は変更できません。",
        ],

        // Validation
        "validation.role_invalid" => [
            "알 수 없는 역할입니다.",
            "Unknown role.",
            "不明な役割です。",
        ],
        "validation.role_not_invitable" => [
            "해당 역할로 초대할 수 없습니다.",
            "You cannot invite members with this role.",
            "この役割で招待することはできません。",
        ],
        "validation.role_not_grantable" => [
            "해당 역할을 부여할 수 없습니다.",
            "You cannot grant this role.",
            "この役割を付与することはできません。",
        ],
        "validation.locale_unsupported" => [
            "지원하지 않는 언어입니다.",
            "Unsupported language.",
            "サポートされていない言語です。",
        ],
        "validation.email_invalid" => [
            "이메일 형식이 올바르지 않습니다.",
            "Invalid email format.",
            "メールアドレスの形式が正しくありません。",
        ],
        "validation.password_length" => [
            "비밀번호는 8자 이상이어야 합니다.",
            "Password must be at least 8 characters.",
            "パスワードは8文字以上である必要があります。",
        ],
        "validation.password_required" => [
            "비밀번호를 입력해 주세요.",
            "Password is required.",
            "パスワードを入力してください。",
        ],
        "validation.name_length" => [
            "이름은 1~100자여야 합니다.",
            "Name must be between 1 and 100 characters.",
            "名前は1〜100文字で入力してください。",
        ],
        "validation.description_length" => [
            "설명은 500자 이하여야 합니다.",
            "Description must be at most 500 characters.",
            "説明は500文字以内で入力してください。",
        ],
        "validation.text_length" => [
            "입력값이 너무 깁니다.",
            "Value is too long.",
            "入力値が長すぎます。",
        ],
        "validation.weekday_range" => [
            "요일은 0(일)~6(토) 사이여야 합니다.",
            "Weekday must be between 0 (Sunday) and 6 (Saturday).",
            "曜日は0(日)〜6(土)で指定してください。",
        ],
        "validation.weekday_duplicate" => [
            "같은 요일이 중복되었습니다.",
            "Each weekday may appear only once.",
            "同じ曜日が重複しています。",
        ],
        "validation.time_range" => [
            "종료 시간은 시작 시간보다 늦어야 합니다.",
            "End time must be after start time.",
            "終了時刻は開始時刻より後にしてください。",
        ],
        "validation.staff_range" => [
            "최대 인원은 최소 인원 이상이어야 합니다.",
            "Maximum staff must be at least the minimum staff.",
            "最大人数は最小人数以上にしてください。",
        ],
        "validation.work_minutes_range" => [
            "근무 시간은 1~1440분이어야 합니다.",
            "Work minutes must be between 1 and 1440.",
            "勤務時間は1〜1440分で指定してください。",
        ],
        "validation.break_minutes_range" => [
            "휴게 시간은 1~240분이어야 합니다.",
            "Break minutes must be between 1 and 240.",
            "休憩時間は1〜240分で指定してください。",
        ],
        "validation.break_shorter_than_work" => [
            "휴게 시간은 근무 시간보다 짧아야 합니다.",
            "Break must be shorter than the work time that earns it.",
            "休憩時間は勤務時間より短くしてください。",
        ],
        "validation.color_format" => [
            "색상은 #RRGGBB 형식이어야 합니다.",
            "Color must be in #RRGGBB format.",
            "色は#RRGGBB形式で指定してください。",
        ],
        "validation.closed_day_has_hours" => [
            "휴무일에는 영업 시간을 지정할 수 없습니다.",
            "Closed days cannot have opening hours.",
            "休業日に営業時間は設定できません。",
        ],
        "validation.open_day_needs_hours" => [
            "영업일에는 시작 및 종료 시간이 필요합니다.",
            "Open days need both an opening and a closing time.",
            "営業日には開始時刻と終了時刻が必要です。",
        ],
        "validation.expiry_days_range" => [
            "초대 유효 기간은 1~30일이어야 합니다.",
            "Invitation lifetime must be between 1 and 30 days.",
            "招待の有効期間は1〜30日で指定してください。",
        ],
        "validation.date_range" => [
            "시작일은 종료일보다 늦을 수 없습니다.",
            "Start date must not be after end date.",
            "開始日は終了日より後にできません。",
        ],
        "validation.refresh_token_missing" => [
            "리프레시 토큰이 없습니다.",
            "Refresh token is missing.",
            "リフレッシュトークンがありません。",
        ],
        "validation.empty_update" => [
            "변경할 항목이 없습니다.",
            "Nothing to update.",
            "更新する項目がありません。",
        ],
        _ => return None,
    };
    Some(texts)
}

/// Look up a catalog message.
pub fn lookup(key: &str, locale: Locale) -> Option<&'static str> {
    let texts = entry(key)?;
    Some(match locale {
        Locale::Ko => texts[0],
        Locale::En => texts[1],
        Locale::Ja => texts[2],
    })
}

/// Translate a key, falling back to the key itself as literal text.
pub fn translate(key: &str, locale: Locale) -> Cow<'_, str> {
    match lookup(key, locale) {
        Some(text) => Cow::Borrowed(text),
        None => Cow::Borrowed(key),
    }
}

/// Check whether a key is present in the catalog
pub fn is_known(key: &str) -> bool {
    entry(key).is_some()
}
