/// Trade sides
///
/// Canonical spellings of the two directions a fill can take.

/// Acquisition of shares or contracts: buy to open, or buy to close a short.
pub const TRADE_SIDE_BUY: &str = "BUY";

/// Disposal of shares or contracts: sell to close, or sell to open a short.
pub const TRADE_SIDE_SELL: &str = "SELL";

/// Broker spellings that map to `BUY`, compared case-insensitively after trimming.
pub const DEFAULT_BUY_ALIASES: [&str; 5] = ["buy", "orderside.buy", "buy_back", "b", "买入"];

/// Broker spellings that map to `SELL`, compared case-insensitively after trimming.
pub const DEFAULT_SELL_ALIASES: [&str; 5] =
    ["sell", "orderside.sell", "sell_short", "s", "卖出"];

/// Header names accepted for each trade column. The first entry is the
/// canonical name; the rest are aliases found in broker exports.
pub const CODE_HEADERS: [&str; 3] = ["code", "symbol", "股票代码"];
pub const SIDE_HEADERS: [&str; 3] = ["side", "direction", "买卖方向"];
pub const QUANTITY_HEADERS: [&str; 3] = ["quantity", "qty", "数量"];
pub const PRICE_HEADERS: [&str; 2] = ["price", "成交价格"];
pub const FEE_HEADERS: [&str; 3] = ["fee", "fees", "合计手续费"];
pub const TIMESTAMP_HEADERS: [&str; 3] = ["timestamp", "time", "交易时间"];
pub const CURRENCY_HEADERS: [&str; 2] = ["currency", "结算币种"];
pub const ACCOUNT_HEADERS: [&str; 2] = ["account_id", "acc_id"];
pub const ORDER_HEADERS: [&str; 1] = ["order_id"];

/// Header names accepted in split configuration files.
pub const SPLIT_DATE_HEADERS: [&str; 3] = ["date", "timestamp", "日期"];
pub const SPLIT_CODE_HEADERS: [&str; 3] = ["code", "symbol", "股票代码"];
pub const SPLIT_RATIO_HEADERS: [&str; 2] = ["ratio", "比例"];
